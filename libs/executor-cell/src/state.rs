/// Drives [`crate::executor::BookingExecutor::run`]'s `match` loop. A plain
/// enum, not a class hierarchy, per spec.md §9 Design Notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    PreWindowWait,
    FindSlot,
    ClickSlot,
    AwaitForm,
    FillAndSubmit,
    Done,
}
