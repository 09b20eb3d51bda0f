pub mod compose;
pub mod dispatcher;
pub mod location_acquisition;
pub mod recipients;
