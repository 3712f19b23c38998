//! Shared table set behind every in-memory repository.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{Mutex, OwnedMutexGuard};

use mushworld_domain::*;

use crate::infrastructure::ports::RepoError;

/// Default limit on how deeply objects may nest inside containers.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 20;

/// Every stored row. Cloned whole when a transaction starts staging.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub locations: HashMap<LocationId, Location>,
    pub exits: HashMap<ExitId, Exit>,
    pub objects: HashMap<ObjectId, Object>,
    pub characters: HashMap<CharacterId, Character>,
    pub participants: HashMap<LocationId, Vec<SceneParticipant>>,
    pub properties: HashMap<PropertyId, EntityProperty>,
}

impl Tables {
    pub fn location(&self, id: LocationId) -> Result<&Location, RepoError> {
        self.locations
            .get(&id)
            .ok_or_else(|| RepoError::not_found("Location", id))
    }

    pub fn object(&self, id: ObjectId) -> Result<&Object, RepoError> {
        self.objects
            .get(&id)
            .ok_or_else(|| RepoError::not_found("Object", id))
    }

    pub fn character(&self, id: CharacterId) -> Result<&Character, RepoError> {
        self.characters
            .get(&id)
            .ok_or_else(|| RepoError::not_found("Character", id))
    }

    /// Containers above `id`, nearest first. Stops at the first repeat so a
    /// corrupted chain cannot loop forever.
    pub fn ancestors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut current = self.objects.get(&id).and_then(|o| o.containment().object_id);
        while let Some(parent) = current {
            if parent == id || chain.contains(&parent) {
                chain.push(parent);
                break;
            }
            chain.push(parent);
            current = self.objects.get(&parent).and_then(|o| o.containment().object_id);
        }
        chain
    }

    /// Levels of nesting below `id`: 0 for an empty container.
    pub fn subtree_height(&self, id: ObjectId) -> usize {
        let mut height = 0;
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let next: Vec<ObjectId> = self
                .objects
                .values()
                .filter(|o| o.containment().object_id.is_some_and(|c| frontier.contains(&c)))
                .map(|o| o.id())
                .collect();
            if next.is_empty() {
                break;
            }
            height += 1;
            if height > self.objects.len() {
                break;
            }
            frontier = next;
        }
        height
    }
}

/// Handle to the shared tables. Clones share the same storage.
///
/// Repositories go through [`tables`](Self::tables) and
/// [`tables_mut`](Self::tables_mut), which resolve to the caller's staged
/// copy while it runs inside [`InMemoryWorld::stage`]. `read`/`write` always
/// reach the shared tables.
#[derive(Debug, Clone)]
pub struct InMemoryWorld {
    tables: Arc<RwLock<Tables>>,
    max_nesting_depth: usize,
}

impl Default for InMemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::with_max_nesting_depth(DEFAULT_MAX_NESTING_DEPTH)
    }

    pub fn with_max_nesting_depth(max_nesting_depth: usize) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            max_nesting_depth,
        }
    }

    pub fn max_nesting_depth(&self) -> usize {
        self.max_nesting_depth
    }

    // A panicking writer leaves whole rows behind, so a poisoned lock is
    // still consistent enough to keep serving.
    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Tables {
        self.read().clone()
    }

    /// Whether the current task is staging writes against this world.
    pub fn in_transaction(&self) -> bool {
        self.staged().is_some()
    }

    pub fn tables(&self) -> Result<TablesRef<'_>, RepoError> {
        match self.staged() {
            Some(staged) => Ok(TablesRef::Staged(lock_staged(staged)?)),
            None => Ok(TablesRef::Shared(self.read())),
        }
    }

    pub fn tables_mut(&self) -> Result<TablesMut<'_>, RepoError> {
        match self.staged() {
            Some(staged) => Ok(TablesMut::Staged(lock_staged(staged)?)),
            None => Ok(TablesMut::Shared(self.write())),
        }
    }

    /// Runs `fut` with repository access redirected to a private copy of
    /// `base`, returning the output and the copy as `fut` left it.
    pub async fn stage<F: Future>(&self, base: Tables, fut: F) -> (F::Output, Tables) {
        let cell = Arc::new(Mutex::new(base));
        let scope = Staged {
            shared: self.tables.clone(),
            tables: cell.clone(),
        };
        let output = STAGED.scope(scope, fut).await;
        let tables = match Arc::try_unwrap(cell) {
            Ok(cell) => cell.into_inner(),
            Err(cell) => cell.lock().await.clone(),
        };
        (output, tables)
    }

    /// Applies the rows that differ between `base` and `staged`.
    ///
    /// Fails without writing anything when a touched row no longer matches
    /// `base` in the shared tables. Returns the number of rows written.
    pub fn commit(&self, base: &Tables, staged: &Tables) -> Result<usize, CommitConflict> {
        let changes = ChangeSet::between(base, staged);
        let mut shared = self.write();
        changes.check(base, &shared)?;
        Ok(changes.apply(&mut shared))
    }

    fn staged(&self) -> Option<Arc<Mutex<Tables>>> {
        STAGED
            .try_with(|s| Arc::ptr_eq(&s.shared, &self.tables).then(|| s.tables.clone()))
            .ok()
            .flatten()
    }
}

tokio::task_local! {
    static STAGED: Staged;
}

struct Staged {
    shared: Arc<RwLock<Tables>>,
    tables: Arc<Mutex<Tables>>,
}

// Only the staging task touches its copy and repositories never nest guards,
// so a held lock here means a guard leaked across a call.
fn lock_staged(staged: Arc<Mutex<Tables>>) -> Result<OwnedMutexGuard<Tables>, RepoError> {
    staged
        .try_lock_owned()
        .map_err(|_| RepoError::database("transaction", "staged tables already borrowed"))
}

/// Read access to either the shared tables or a staged copy.
pub enum TablesRef<'a> {
    Shared(RwLockReadGuard<'a, Tables>),
    Staged(OwnedMutexGuard<Tables>),
}

impl Deref for TablesRef<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        match self {
            Self::Shared(guard) => &**guard,
            Self::Staged(guard) => &**guard,
        }
    }
}

/// Write access to either the shared tables or a staged copy.
pub enum TablesMut<'a> {
    Shared(RwLockWriteGuard<'a, Tables>),
    Staged(OwnedMutexGuard<Tables>),
}

impl Deref for TablesMut<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        match self {
            Self::Shared(guard) => &**guard,
            Self::Staged(guard) => &**guard,
        }
    }
}

impl DerefMut for TablesMut<'_> {
    fn deref_mut(&mut self) -> &mut Tables {
        match self {
            Self::Shared(guard) => &mut **guard,
            Self::Staged(guard) => &mut **guard,
        }
    }
}

/// A staged row changed in the shared tables after staging began.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {key} changed outside the transaction")]
pub struct CommitConflict {
    pub table: &'static str,
    pub key: String,
}

/// Row-level writes per table: `None` removes the row.
type Rows<K, V> = Vec<(K, Option<V>)>;

fn diff<K, V>(base: &HashMap<K, V>, staged: &HashMap<K, V>) -> Rows<K, V>
where
    K: Copy + Eq + Hash,
    V: Clone + PartialEq,
{
    let mut rows: Rows<K, V> = staged
        .iter()
        .filter(|(key, value)| base.get(*key) != Some(*value))
        .map(|(key, value)| (*key, Some(value.clone())))
        .collect();
    rows.extend(
        base.keys()
            .filter(|key| !staged.contains_key(*key))
            .map(|key| (*key, None)),
    );
    rows
}

fn check<K, V>(
    table: &'static str,
    rows: &Rows<K, V>,
    base: &HashMap<K, V>,
    shared: &HashMap<K, V>,
) -> Result<(), CommitConflict>
where
    K: Eq + Hash + fmt::Display,
    V: PartialEq,
{
    match rows.iter().find(|(key, _)| base.get(key) != shared.get(key)) {
        Some((key, _)) => Err(CommitConflict {
            table,
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

fn apply<K: Eq + Hash, V>(rows: Rows<K, V>, shared: &mut HashMap<K, V>) {
    for (key, value) in rows {
        match value {
            Some(value) => shared.insert(key, value),
            None => shared.remove(&key),
        };
    }
}

struct ChangeSet {
    locations: Rows<LocationId, Location>,
    exits: Rows<ExitId, Exit>,
    objects: Rows<ObjectId, Object>,
    characters: Rows<CharacterId, Character>,
    participants: Rows<LocationId, Vec<SceneParticipant>>,
    properties: Rows<PropertyId, EntityProperty>,
}

impl ChangeSet {
    fn between(base: &Tables, staged: &Tables) -> Self {
        Self {
            locations: diff(&base.locations, &staged.locations),
            exits: diff(&base.exits, &staged.exits),
            objects: diff(&base.objects, &staged.objects),
            characters: diff(&base.characters, &staged.characters),
            participants: diff(&base.participants, &staged.participants),
            properties: diff(&base.properties, &staged.properties),
        }
    }

    fn check(&self, base: &Tables, shared: &Tables) -> Result<(), CommitConflict> {
        check("location", &self.locations, &base.locations, &shared.locations)?;
        check("exit", &self.exits, &base.exits, &shared.exits)?;
        check("object", &self.objects, &base.objects, &shared.objects)?;
        check("character", &self.characters, &base.characters, &shared.characters)?;
        check("scene roster", &self.participants, &base.participants, &shared.participants)?;
        check("property", &self.properties, &base.properties, &shared.properties)
    }

    fn apply(self, shared: &mut Tables) -> usize {
        let written = self.locations.len()
            + self.exits.len()
            + self.objects.len()
            + self.characters.len()
            + self.participants.len()
            + self.properties.len();
        apply(self.locations, &mut shared.locations);
        apply(self.exits, &mut shared.exits);
        apply(self.objects, &mut shared.objects);
        apply(self.characters, &mut shared.characters);
        apply(self.participants, &mut shared.participants);
        apply(self.properties, &mut shared.properties);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn nested(tables: &mut Tables, depth: usize) -> Vec<ObjectId> {
        let room = LocationId::new();
        let mut ids = Vec::new();
        let mut containment = Containment::in_location(room);
        for i in 0..depth {
            let object = Object::new(format!("box {i}"), containment, Utc::now())
                .unwrap()
                .with_container(true);
            containment = Containment::inside(object.id());
            ids.push(object.id());
            tables.objects.insert(object.id(), object);
        }
        ids
    }

    #[test]
    fn ancestors_walk_up_the_container_chain() {
        let mut tables = Tables::default();
        let ids = nested(&mut tables, 3);
        assert_eq!(tables.ancestors(ids[2]), vec![ids[1], ids[0]]);
        assert!(tables.ancestors(ids[0]).is_empty());
    }

    #[test]
    fn subtree_height_counts_levels_below() {
        let mut tables = Tables::default();
        let ids = nested(&mut tables, 4);
        assert_eq!(tables.subtree_height(ids[0]), 3);
        assert_eq!(tables.subtree_height(ids[3]), 0);
    }

    fn room(name: &str) -> Location {
        Location::new(LocationType::Persistent, name, "", Utc::now())
    }

    #[tokio::test]
    async fn staged_writes_stay_private_until_commit() {
        let world = InMemoryWorld::new();
        let hall = room("Hall");
        let hall_id = hall.id();
        let base = world.snapshot();

        let (seen_inside, staged) = world
            .stage(base.clone(), async {
                world.tables_mut().unwrap().locations.insert(hall_id, hall);
                let inside = world.tables().unwrap().locations.contains_key(&hall_id);
                (inside, world.read().locations.contains_key(&hall_id))
            })
            .await;

        assert_eq!(seen_inside, (true, false));
        assert!(world.read().locations.is_empty());
        assert_eq!(world.commit(&base, &staged).unwrap(), 1);
        assert!(world.read().locations.contains_key(&hall_id));
    }

    #[tokio::test]
    async fn commit_keeps_rows_written_by_others() {
        let world = InMemoryWorld::new();
        let kept = room("Kept");
        let doomed = room("Doomed");
        world.write().locations.insert(doomed.id(), doomed.clone());
        let base = world.snapshot();

        let ((), staged) = world
            .stage(base.clone(), async {
                world.tables_mut().unwrap().locations.remove(&doomed.id());
            })
            .await;
        world.write().locations.insert(kept.id(), kept.clone());
        world.commit(&base, &staged).unwrap();

        let tables = world.read();
        assert!(tables.locations.contains_key(&kept.id()));
        assert!(!tables.locations.contains_key(&doomed.id()));
    }

    #[tokio::test]
    async fn commit_rejects_rows_changed_since_staging() {
        let world = InMemoryWorld::new();
        let hall = room("Hall");
        world.write().locations.insert(hall.id(), hall.clone());
        let base = world.snapshot();

        let ((), staged) = world
            .stage(base.clone(), async {
                world.tables_mut().unwrap().locations.remove(&hall.id());
            })
            .await;
        let mut renamed = hall.clone();
        renamed.set_name("Great Hall");
        world.write().locations.insert(hall.id(), renamed.clone());

        let conflict = world.commit(&base, &staged).unwrap_err();
        assert_eq!(conflict.table, "location");
        assert_eq!(world.read().locations.get(&hall.id()), Some(&renamed));
    }
}
