/// DMG hardware revision.
///
/// Only affects the register values left behind by the boot ROM; the
/// instruction set is identical across revisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DmgRevision {
    Rev0,
    RevA,
    RevB,
    #[default]
    RevC,
}

impl DmgRevision {
    /// Parses the short names accepted by the frontend (`0`, `a`, `b`, `c`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "0" | "rev0" => Some(Self::Rev0),
            "a" | "reva" => Some(Self::RevA),
            "b" | "revb" => Some(Self::RevB),
            "c" | "revc" => Some(Self::RevC),
            _ => None,
        }
    }
}
