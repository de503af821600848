/// Streamers served by a default camera deployment.
pub const DEFAULT_CAMERAS: [&str; 8] = [
    "Camera01_Default",
    "Camera02_Default",
    "Camera03_Default",
    "Camera04_Default",
    "Camera05_Fisheye",
    "Camera06_Fisheye",
    "Camera07_Fisheye",
    "Camera08_Fisheye",
];

const ALL: &str = "all";

/// Expands `all` and drops repeats, keeping first-seen order.
pub fn expand_streamers(requested: &[String]) -> Vec<String> {
    let mut streamers: Vec<String> = Vec::new();

    for name in requested {
        let expanded: Vec<String> = if name.eq_ignore_ascii_case(ALL) {
            DEFAULT_CAMERAS.iter().map(|c| c.to_string()).collect()
        } else {
            vec![name.clone()]
        };

        for streamer in expanded {
            if !streamers.contains(&streamer) {
                streamers.push(streamer);
            }
        }
    }

    streamers
}
