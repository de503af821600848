use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

impl SdpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Answer => "answer",
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the first `a=ice-ufrag:` attribute of `sdp`, if any.
pub fn ice_ufrag(sdp: &str) -> Option<&str> {
    sdp.lines()
        .filter_map(|line| line.trim().strip_prefix("a=ice-ufrag:"))
        .filter_map(|rest| rest.split_whitespace().next())
        .next()
}
