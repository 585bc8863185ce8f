//! Asset loading contract and model cache
//!
//! Mesh and texture decoding lives behind [`ModelLoader`]; the engine only
//! needs a handle it can pass back to the renderer. [`ModelCache`] memoizes
//! models by `(mesh, texture)` name and substitutes a placeholder when the
//! loader fails, so a missing asset never stops a level from loading.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// The named asset does not exist
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The asset exists but could not be decoded or uploaded
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),
}

/// Backend-assigned identifier of an uploaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u32);

impl ModelId {
    /// Identifier reserved for the placeholder model
    pub const PLACEHOLDER: Self = Self(0);
}

/// A loaded mesh + texture pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    /// Backend handle
    pub id: ModelId,
    /// Mesh name the model was loaded from
    pub mesh: String,
    /// Texture name the model was loaded from
    pub texture: String,
}

impl Model {
    /// Create a model record
    pub fn new(id: ModelId, mesh: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            id,
            mesh: mesh.into(),
            texture: texture.into(),
        }
    }

    /// Model drawn in place of assets that failed to load
    pub fn placeholder() -> Self {
        Self::new(ModelId::PLACEHOLDER, "cube", "placeholder.png")
    }

    /// Whether this is the fallback model
    pub fn is_placeholder(&self) -> bool {
        self.id == ModelId::PLACEHOLDER
    }
}

/// Loads meshes and textures into backend models
pub trait ModelLoader {
    /// Load the model built from `mesh` and `texture`
    fn load_model(&mut self, mesh: &str, texture: &str) -> Result<Model, AssetError>;
}

/// Loader that hands out sequential ids without touching any backend
///
/// Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullModelLoader {
    next_id: u32,
}

impl ModelLoader for NullModelLoader {
    fn load_model(&mut self, mesh: &str, texture: &str) -> Result<Model, AssetError> {
        self.next_id += 1;
        Ok(Model::new(ModelId(self.next_id), mesh, texture))
    }
}

/// Name-keyed model cache with placeholder fallback
pub struct ModelCache<L: ModelLoader> {
    loader: L,
    models: HashMap<(String, String), Arc<Model>>,
    placeholder: Arc<Model>,
}

impl<L: ModelLoader> ModelCache<L> {
    /// Create an empty cache backed by `loader`
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            models: HashMap::new(),
            placeholder: Arc::new(Model::placeholder()),
        }
    }

    /// Fetch a model, loading it on first use
    ///
    /// A load failure is logged and the placeholder is cached under the
    /// requested name so the loader is not retried every frame.
    pub fn get_or_load(&mut self, mesh: &str, texture: &str) -> Arc<Model> {
        let key = (mesh.to_string(), texture.to_string());
        if let Some(model) = self.models.get(&key) {
            return Arc::clone(model);
        }

        let model = match self.loader.load_model(mesh, texture) {
            Ok(model) => {
                log::debug!("Loaded model {}/{} as {:?}", mesh, texture, model.id);
                Arc::new(model)
            }
            Err(e) => {
                log::warn!("{}; using placeholder for {}/{}", e, mesh, texture);
                Arc::clone(&self.placeholder)
            }
        };

        self.models.insert(key, Arc::clone(&model));
        model
    }

    /// Whether a model for this name pair has been requested before
    pub fn contains(&self, mesh: &str, texture: &str) -> bool {
        self.models.contains_key(&(mesh.to_string(), texture.to_string()))
    }

    /// Number of cached name pairs
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Access the underlying loader
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loader that fails for one mesh name and counts calls
    struct FlakyLoader {
        missing: &'static str,
        calls: usize,
    }

    impl ModelLoader for FlakyLoader {
        fn load_model(&mut self, mesh: &str, texture: &str) -> Result<Model, AssetError> {
            self.calls += 1;
            if mesh == self.missing {
                return Err(AssetError::NotFound(mesh.to_string()));
            }
            Ok(Model::new(ModelId(self.calls as u32), mesh, texture))
        }
    }

    #[test]
    fn test_models_are_cached_by_name() {
        let mut cache = ModelCache::new(NullModelLoader::default());

        let first = cache.get_or_load("car", "car.png");
        let second = cache.get_or_load("car", "car.png");
        let other = cache.get_or_load("car", "car_red.png");

        assert!(Arc::ptr_eq(&first, &second));
        assert_ne!(first.id, other.id);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_falls_back_to_placeholder_once() {
        let mut cache = ModelCache::new(FlakyLoader { missing: "ghost", calls: 0 });

        let model = cache.get_or_load("ghost", "ghost.png");
        let again = cache.get_or_load("ghost", "ghost.png");

        assert!(model.is_placeholder());
        assert!(again.is_placeholder());
        assert_eq!(cache.loader().calls, 1);
        assert!(cache.contains("ghost", "ghost.png"));
    }
}
