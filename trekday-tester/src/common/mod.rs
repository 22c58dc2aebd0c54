pub mod loader;
pub mod scenario;
pub mod util;

pub use loader::load_itinerary;
pub use util::split_csv;
