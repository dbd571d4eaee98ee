#![allow(dead_code)]

#[path = "../../src/testing.rs"]
mod fixture;

use bridgegen_codegen::{CompilationContext, Pipeline};
pub use fixture::Fixture;

/// Run the full pipeline over a fixture with its default manifest.
pub fn generate(fixture: &Fixture) -> CompilationContext {
    Pipeline::new()
        .run(fixture.manifest(), fixture.sources())
        .expect("pipeline should succeed")
}

/// The generated server text.
pub fn generated_text(fixture: &Fixture) -> String {
    generate(fixture)
        .take_output()
        .expect("emit phase ran")
        .content()
        .to_string()
}
