use profile_form::TaskResultKind;
use strum::Display;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    /// Re-fetch every remote collection.
    Refresh,
    /// Message for the status bar.
    Status(String),
    TaskStarted(u64, String),
    TaskFinished(u64, TaskResultKind),
    Update,
}
