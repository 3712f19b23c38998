//! In-memory entity property repository.

use async_trait::async_trait;
use mushworld_domain::*;

use super::store::InMemoryWorld;
use crate::infrastructure::ports::{PropertyRepo, RepoError};

pub struct InMemoryPropertyRepo {
    world: InMemoryWorld,
}

impl InMemoryPropertyRepo {
    pub fn new(world: InMemoryWorld) -> Self {
        Self { world }
    }
}

#[async_trait]
impl PropertyRepo for InMemoryPropertyRepo {
    async fn create(&self, property: &EntityProperty) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        if tables.properties.contains_key(&property.id()) {
            return Err(RepoError::constraint(format!(
                "property {} already exists",
                property.id()
            )));
        }
        let duplicate = tables
            .properties
            .values()
            .any(|p| p.parent() == property.parent() && p.name() == property.name());
        if duplicate {
            return Err(RepoError::constraint(format!(
                "{} already has a property named {:?}",
                property.parent(),
                property.name()
            )));
        }
        tables.properties.insert(property.id(), property.clone());
        Ok(())
    }

    async fn get(&self, id: PropertyId) -> Result<EntityProperty, RepoError> {
        self.world
            .tables()?
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("Property", id))
    }

    async fn list_by_parent(&self, parent: PropertyParent) -> Result<Vec<EntityProperty>, RepoError> {
        let mut found: Vec<EntityProperty> = self
            .world
            .tables()?
            .properties
            .values()
            .filter(|p| p.parent() == parent)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(found)
    }

    async fn update(&self, property: &EntityProperty) -> Result<(), RepoError> {
        let mut tables = self.world.tables_mut()?;
        match tables.properties.get_mut(&property.id()) {
            Some(stored) => {
                *stored = property.clone();
                Ok(())
            }
            None => Err(RepoError::not_found("Property", property.id())),
        }
    }

    async fn delete(&self, id: PropertyId) -> Result<(), RepoError> {
        self.world
            .tables_mut()?
            .properties
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Property", id))
    }

    async fn delete_by_parent(&self, parent: PropertyParent) -> Result<(), RepoError> {
        self.world
            .tables_mut()?
            .properties
            .retain(|_, p| p.parent() != parent);
        Ok(())
    }
}
