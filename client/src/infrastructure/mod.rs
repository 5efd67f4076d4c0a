// Infrastructure layer - external concerns (backend HTTP API, terminal)
// Implements interfaces defined in application layer

pub mod driven;    // Output adapters (backend gateway)
pub mod driving;   // Input adapters (terminal front-end)
