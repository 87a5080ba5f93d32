pub mod auth;
pub mod books;
pub mod reviews;

use shelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register_custom(auth::create_module());
    registry.register_custom(books::create_module());
    registry.register_custom(reviews::create_module());
}
