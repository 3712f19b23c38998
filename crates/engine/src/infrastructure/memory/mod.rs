//! In-memory world storage.
//!
//! Every repository shares one [`InMemoryWorld`] table set, so a transaction
//! staged by [`InMemoryTransactor`] covers all of them.

use std::sync::Arc;

mod characters;
mod exits;
mod locations;
mod objects;
mod properties;
mod scenes;
mod similarity;
mod store;
mod transactor;

pub use characters::InMemoryCharacterRepo;
pub use exits::InMemoryExitRepo;
pub use locations::InMemoryLocationRepo;
pub use objects::InMemoryObjectRepo;
pub use properties::InMemoryPropertyRepo;
pub use scenes::InMemorySceneRepo;
pub use similarity::similarity;
pub use store::{
    CommitConflict, InMemoryWorld, Tables, TablesMut, TablesRef, DEFAULT_MAX_NESTING_DEPTH,
};
pub use transactor::InMemoryTransactor;

/// Create all in-memory repositories over one shared world.
pub struct InMemoryRepositories {
    pub location: Arc<InMemoryLocationRepo>,
    pub exit: Arc<InMemoryExitRepo>,
    pub object: Arc<InMemoryObjectRepo>,
    pub character: Arc<InMemoryCharacterRepo>,
    pub scene: Arc<InMemorySceneRepo>,
    pub property: Arc<InMemoryPropertyRepo>,
    pub transactor: Arc<InMemoryTransactor>,
}

impl InMemoryRepositories {
    pub fn new(world: InMemoryWorld) -> Self {
        Self {
            location: Arc::new(InMemoryLocationRepo::new(world.clone())),
            exit: Arc::new(InMemoryExitRepo::new(world.clone())),
            object: Arc::new(InMemoryObjectRepo::new(world.clone())),
            character: Arc::new(InMemoryCharacterRepo::new(world.clone())),
            scene: Arc::new(InMemorySceneRepo::new(world.clone())),
            property: Arc::new(InMemoryPropertyRepo::new(world.clone())),
            transactor: Arc::new(InMemoryTransactor::new(world)),
        }
    }
}
