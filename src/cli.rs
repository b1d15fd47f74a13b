use clap::Parser;
use std::path::PathBuf;

/// Timeline sync engine: resolve the active shot per master frame and
/// propagate time into shot scenes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Session JSON to load (project + sync settings)
    #[arg(value_name = "SESSION")]
    pub session: Option<PathBuf>,

    /// Use the built-in demo project instead of a session
    #[arg(short = 'd', long = "demo")]
    pub demo: bool,

    /// Master frames to evaluate (can be specified multiple times)
    #[arg(short = 'f', long = "frame", value_name = "N")]
    pub frames: Vec<i32>,

    /// Evaluate every master frame in START..=END
    #[arg(long = "range", value_names = ["START", "END"], num_args = 2)]
    pub range: Option<Vec<i32>>,

    /// Bypass the resolution cache on every update
    #[arg(long = "force")]
    pub force: bool,

    /// Report which shots use the named object
    #[arg(long = "usage", value_name = "OBJECT")]
    pub usage: Option<String>,

    /// Save the resulting session to this path (.json is enforced)
    #[arg(short = 's', long = "save", value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Enable logging to file (default: seqsync.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Frames from `--frame` followed by `--range`, in order.
    pub fn frame_list(&self) -> Vec<i32> {
        let mut frames = self.frames.clone();
        if let Some(range) = &self.range {
            if let [start, end] = range.as_slice() {
                frames.extend(*start..=*end);
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frames_and_range() {
        let args = Args::parse_from(["seqsync", "--demo", "-f", "5", "--range", "10", "12", "-vv"]);
        assert!(args.demo);
        assert_eq!(args.verbosity, 2);
        assert_eq!(args.frame_list(), vec![5, 10, 11, 12]);
    }

    #[test]
    fn test_log_flag_without_value() {
        let args = Args::parse_from(["seqsync", "session.json", "--log"]);
        assert_eq!(args.session, Some(PathBuf::from("session.json")));
        assert_eq!(args.log_file, Some(None));
    }
}
