use crate::events::StateEvent;

/// Output renderer for the headless flow (controls output format).
pub trait SnapshotRenderer: Send {
    fn name(&self) -> &str;
    fn format(&self) -> &str;
    fn render(&mut self, event: &StateEvent) -> std::io::Result<()>;

    /// Flush whatever the renderer still holds once the flow ends.
    fn finish(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
