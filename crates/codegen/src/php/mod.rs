//! PHP source emitters
//!
//! Each submodule renders one family of stubs and returns the files at
//! their module-relative paths. Migrations live in [`crate::migrations`].
//!
//! | emitter      | files                                                   |
//! |--------------|---------------------------------------------------------|
//! | models       | `app/Models/<Entity>.php`                               |
//! | factories    | `Database/Factories/<Entity>Factory.php`                |
//! | seeders      | entity, module and permission seeders                   |
//! | json_api     | schema, resource, authorizer, request, `Server.php`     |
//! | controllers  | `app/Http/Controllers/Api/V1/<Entity>Controller.php`    |
//! | routes       | `routes/api.php`                                        |
//! | test_gen     | `Tests/Feature/<Entity>{Index,Show,Store,Update,Destroy}Test.php` |

pub mod controllers;
pub mod factories;
pub mod json_api;
pub mod models;
pub mod routes;
pub mod seeders;
pub mod test_gen;

pub use controllers::generate_controllers;
pub use factories::generate_factories;
pub use json_api::generate_json_api;
pub use models::generate_models;
pub use routes::generate_routes;
pub use seeders::generate_seeders;
pub use test_gen::generate_tests;

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::StubRenderer;
use crate::views::ModuleViews;
use blueprint_core::EngineResult;

/// Render every PHP source of a module except migrations
pub fn generate_php_sources(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = generate_models(ctx, views, stubs)?;

    if ctx.config.generate_factories {
        files.extend(generate_factories(ctx, views, stubs)?);
    }
    files.extend(generate_seeders(ctx, views, stubs)?);
    files.extend(generate_json_api(ctx, views, stubs)?);
    files.extend(generate_controllers(ctx, views, stubs)?);
    files.extend(generate_routes(ctx, views, stubs)?);

    if ctx.config.generate_tests {
        files.extend(generate_tests(ctx, views, stubs)?);
    }

    Ok(files)
}
