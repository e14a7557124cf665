// Test modules for categorized-retry
//
// Each source module has a corresponding test file that focuses on
// behavior verification rather than implementation details.

// Test helper utilities
pub mod helpers;
