//! GPU resources of the demo.
//!
//! `program` builds the pipeline, `quad` owns the geometry and per-frame
//! uniforms, `texture` owns the two-phase bubble texture.

mod program;
mod quad;
mod texture;

pub use program::{compile_stage, link, ProgramTargets, ShaderProgram, ShaderStage};
pub use quad::{Globals, QuadRenderer, QuadVertex, CLEAR_COLOR, GLOBAL_COLOR, QUAD_VERTICES};
pub use texture::{
    generate_mip_chain, is_power_of_two, mip_level_count, BubbleTexture, TextureFiltering,
    PLACEHOLDER_PIXEL,
};
