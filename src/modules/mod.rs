// Module exports for pure logic
pub mod chrome;      // Read model for the UI chrome
pub mod navigation;  // Address-bar parsing and tab labels
pub mod tabs;        // Tab collection and index bookkeeping
pub mod view;        // Embedded view contract

#[cfg(test)]
pub(crate) mod testing;
