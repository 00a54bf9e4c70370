/// Router Module Index
///
/// Organizes the application's routes by section. Every section sits behind the
/// session gateway; the sections themselves are mounted at the paths configured in
/// `RoutePaths`, the same ones the routing policy reasons about.

/// The landing page and the auth section (reachable without a session).
pub mod public;

/// The vendor section.
pub mod vendor;

/// The admin section. Pages additionally use the `AdminPage` render-time gate.
pub mod admin;

/// JSON API under the API prefix.
pub mod api;
