//! A camera plus the entities it looks at, driven once per frame.

use std::time::Duration;

use log::warn;

use crate::entity::{Entity, Renderable};
use crate::error::RenderError;
use crate::projection::Camera;
use crate::render::{Renderer, ShaderRegistry};

#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub camera: Camera,
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            entities: Vec::new(),
        }
    }

    /// Add an entity, returning its index.
    pub fn add(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// First entity called `name`.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name() == name)
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name() == name)
    }

    /// Advance every entity by `elapsed`.
    pub fn update(&mut self, elapsed: Duration) {
        for entity in &mut self.entities {
            entity.update(elapsed);
        }
    }

    /// Bind the camera, then draw every uploaded entity.
    ///
    /// An entity whose matrices cannot be inverted this frame is skipped with a
    /// warning. Binding failures abort the pass. Returns the number of entities
    /// drawn.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        registry: &ShaderRegistry,
    ) -> Result<usize, RenderError> {
        self.camera.bind(renderer, registry)?;

        let mut drawn = 0;
        for entity in self.entities.iter_mut().filter(|e| e.is_uploaded()) {
            match entity.render(renderer, registry) {
                Ok(()) => drawn += 1,
                Err(RenderError::Math(err)) => {
                    warn!("skipping `{}` this frame: {err}", entity.name());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(drawn)
    }
}
