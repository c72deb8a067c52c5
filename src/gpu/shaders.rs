//! WGSL shader sources.
//!
//! All three pipelines share the same per-view uniform block. Sprites are
//! camera-facing billboard impostors; because the camera never rotates (the
//! stereo views are pure shears) the billboard plane is simply the world xy
//! plane, and impostor normals can be lit in world space.

/// Instanced billboard spheres: the points and the player.
pub const SPRITE_SHADER: &str = r#"struct Uniforms {
    view_proj: mat4x4<f32>,
    light_pos: vec3<f32>,
    time: f32,
    light_color: vec3<f32>,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) center: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) size: f32,
    @location(4) emissive: f32,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) center: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec3<f32>,
    @location(3) emissive: f32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let corner = quad_vertices[vertex_index];
    // Camera right/up are the world x/y axes for every view.
    let world = center + vec3<f32>(corner * size, 0.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.uv = corner;
    out.center = center;
    out.color = color;
    out.size = size;
    out.emissive = emissive;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let d2 = dot(in.uv, in.uv);
    if d2 > 1.0 {
        discard;
    }
    let alpha = 1.0 - smoothstep(0.85, 1.0, sqrt(d2));

    // The player glows in its own color instead of being lit.
    if in.emissive > 0.5 {
        let glow = 1.0 - 0.35 * d2;
        return vec4<f32>(in.color * glow, alpha);
    }

    let normal = vec3<f32>(in.uv, sqrt(1.0 - d2));
    let surface = in.center + normal * in.size;
    let to_light = uniforms.light_pos - surface;
    let dist2 = max(dot(to_light, to_light), 1e-4);
    let diffuse = max(dot(normal, to_light * inverseSqrt(dist2)), 0.0);
    let lit = uniforms.light_color * diffuse * (2.0 / (1.0 + dist2));
    let shade = in.color * (0.06 + lit);
    return vec4<f32>(shade, alpha);
}
"#;

/// Boundary box edges.
pub const WIRE_SHADER: &str = r#"struct Uniforms {
    view_proj: mat4x4<f32>,
    light_pos: vec3<f32>,
    time: f32,
    light_color: vec3<f32>,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(position, 1.0);
    return out;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.16, 0.17, 0.20, 1.0);
}
"#;

/// Fullscreen triangle presenting the quilt texture to the window.
pub const BLIT_SHADER: &str = r#"struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0)
var quilt: texture_2d<f32>;
@group(0) @binding(1)
var quilt_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 3.0, -1.0),
        vec2<f32>(-1.0,  3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(quilt, quilt_sampler, in.uv);
}
"#;
