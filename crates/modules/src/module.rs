//! Module trait - the frame lifecycle every domain module follows

use contracts::FrameContext;
use data_manager::DataManager;

use crate::error::Result;

/// A domain module driven once per frame
///
/// Modules create their handles in `initialize` and only touch them in the
/// per-frame phases. Every phase gets the data manager so a module can force
/// a read or write through [`DataManager::read_now`] and
/// [`DataManager::write_now`].
pub trait Module {
    /// Module name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Create handles; called once before the first frame
    fn initialize(&mut self, manager: &mut DataManager) -> Result<()>;

    /// Runs after the data manager refreshed auto-read handles
    fn pre_update(&mut self, _manager: &mut DataManager, _frame: &FrameContext) -> Result<()> {
        Ok(())
    }

    /// Main computation
    fn update(&mut self, manager: &mut DataManager, frame: &FrameContext) -> Result<()>;

    /// Runs before the data manager flushes auto-write handles
    fn post_update(&mut self, _manager: &mut DataManager, _frame: &FrameContext) -> Result<()> {
        Ok(())
    }

    /// Called once after the last frame
    fn shutdown(&mut self, _manager: &mut DataManager) -> Result<()> {
        Ok(())
    }
}
