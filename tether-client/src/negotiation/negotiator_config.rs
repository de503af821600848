use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NegotiatorConfig {
    pub ice_servers: Vec<String>,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun2.l.google.com:19302".to_owned()],
        }
    }
}
