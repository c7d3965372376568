mod api_server;

pub use api_server::{router, ApiServer, ApiState};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use api_server::{
    GeocodeParams, GeocodeResponse, HealthResponse, SearchParams, SearchResponse, VendorResult,
};
