pub mod generator;
pub mod interests;
pub mod snapshot;
pub mod user;

pub use interests::{InterestCatalog, InterestVector};
pub use snapshot::UserSnapshot;
pub use user::{Post, PostList, UserRecord};
