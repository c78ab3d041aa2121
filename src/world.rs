use log::debug;

use crate::assets::{AssetManager, Handle};
use crate::mesh::{Mesh, Transform};
use crate::terrain::{SimulationParams, Terrain};

/// Identifier of an entity inside a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(u64);

/// Something drawable in the scene, optionally backed by simulated terrain.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub terrain: Option<Terrain>,
    pub mesh: Handle<Mesh>,
    pub transform: Transform,
}

/// Container for every entity in the running scenario.
#[derive(Debug, Default)]
pub struct World {
    entities: Vec<Entity>,
    next_id: u64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a terrain entity and registers its mesh.
    pub fn insert_terrain(
        &mut self,
        terrain: Terrain,
        assets: &mut AssetManager<Mesh>,
    ) -> EntityId {
        let mesh = assets.insert(terrain.mesh());
        self.push(Some(terrain), mesh, Transform::default())
    }

    fn push(&mut self, terrain: Option<Terrain>, mesh: Handle<Mesh>, transform: Transform) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            terrain,
            mesh,
            transform,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn terrains(&self) -> impl Iterator<Item = &Terrain> {
        self.entities
            .iter()
            .filter_map(|entity| entity.terrain.as_ref())
    }

    /// Removes every entity and the meshes they own.
    pub fn clear(&mut self, assets: &mut AssetManager<Mesh>) {
        for entity in self.entities.drain(..) {
            assets.remove(entity.mesh);
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Steps the water on every terrain entity and refreshes its mesh.
    pub fn simulate(&mut self, params: &SimulationParams, assets: &mut AssetManager<Mesh>) {
        for entity in &mut self.entities {
            let Some(terrain) = entity.terrain.as_mut() else {
                continue;
            };
            terrain.water_simulation(params);
            let mesh = terrain.mesh();
            if assets.contains(entity.mesh) {
                assets.replace(entity.mesh, mesh);
            } else {
                entity.mesh = assets.insert(mesh);
            }
            debug!(
                "entity {:?}: water volume {:.4}",
                entity.id,
                terrain.volume()
            );
        }
    }
}
