pub mod dispatch;
pub mod location;
pub mod requests;
pub mod weather;

// Re-export commonly used types
pub use dispatch::{AggregateOutcome, DispatchResult};
pub use location::LocationFix;
pub use requests::{
    ErrorResponse, HealthResponse, SendSmsRequest, SendSmsResponse, WeatherQuery,
};
pub use weather::{WeatherReport, WeatherSource};
