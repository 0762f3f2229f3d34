pub mod books;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use bookshop_db::CatalogStore;
use bookshop_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry, sharing one catalog
pub fn register_all(
    registry: &mut ModuleRegistry,
    catalog: &Arc<CatalogStore>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(catalog.clone()))?;
    registry.register(reviews::create_module(catalog.clone()))?;
    registry.register(users::create_module(catalog.clone()))?;
    Ok(())
}
