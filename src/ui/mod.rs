/// Presentation layer: everything here reads [`crate::state::AppState`] and
/// turns widget interactions into state calls.
pub mod insights;
pub mod panels;
pub mod plot;
pub mod table;
