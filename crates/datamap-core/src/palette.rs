use std::collections::HashMap;
use std::sync::Arc;

/// Memoized alternate color buffers, keyed by field name.
///
/// Each palette is built at most once; later lookups return the shared buffer.
#[derive(Debug, Default)]
pub struct PaletteCache {
    palettes: HashMap<String, Arc<[u8]>>,
    builds: usize,
}

impl PaletteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the palette for `field`, calling `build` only on a cache miss.
    pub fn get_or_try_build<E, F>(&mut self, field: &str, build: F) -> Result<Arc<[u8]>, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        if let Some(palette) = self.palettes.get(field) {
            return Ok(Arc::clone(palette));
        }
        let palette: Arc<[u8]> = build()?.into();
        self.builds += 1;
        log::debug!("Built palette '{}' ({} bytes)", field, palette.len());
        self.palettes.insert(field.to_string(), Arc::clone(&palette));
        Ok(palette)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.palettes.contains_key(field)
    }

    /// Number of palettes constructed so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}
