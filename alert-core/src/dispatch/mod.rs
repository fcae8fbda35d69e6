//! Dispatch — decision-to-command mapping
//!
//! | State/Level        | Relay | Vibrator | Visual    | One-shot buzzer |
//! |--------------------|-------|----------|-----------|-----------------|
//! | EyesOpen           | on    | off      | off       | -               |
//! | EyesClosed, None   | on    | off      | red       | -               |
//! | EyesClosed, Level1 | on    | off      | red+green | 100 Hz x10      |
//! | EyesClosed, Level2 | on    | off      | red+green | 200 Hz x15      |
//! | EyesClosed, Level3 | on    | on       | red+green | 300 Hz x20      |
//! | EyesClosed, Cutoff | off   | off      | red+green | -               |

pub mod commands;
pub mod dispatcher;

pub use commands::{BuzzerPattern, CommandSet, Switch, VisualIndicator};
pub use dispatcher::{closed_profile, AlertDispatcher, LevelProfile};
