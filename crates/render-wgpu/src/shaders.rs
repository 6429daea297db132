/// Lit mesh shader: ambient + directional + spot, Blinn-Phong specular,
/// PCF shadow lookups. Layer 0 of the shadow map is the spotlight, layer 1
/// the directional light.
pub const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    // xyz direction, w = enabled
    sun_dir: vec4<f32>,
    // rgb radiance, w = casts shadow
    sun_radiance: vec4<f32>,
    sun_view_proj: mat4x4<f32>,
    // xyz position, w = enabled
    spot_pos: vec4<f32>,
    // xyz direction, w = casts shadow
    spot_dir: vec4<f32>,
    spot_radiance: vec4<f32>,
    // distance, decay, cos_outer, cos_inner
    spot_params: vec4<f32>,
    spot_view_proj: mat4x4<f32>,
    // texel size, depth bias
    shadow_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;
@group(0) @binding(1)
var shadow_map: texture_depth_2d_array;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    // unlit, roughness, metalness, receive_shadow
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = globals.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = vertex.color;
    out.params = instance.params;
    return out;
}

const PI: f32 = 3.14159265;

fn shadow_factor(light_view_proj: mat4x4<f32>, world_pos: vec3<f32>, layer: i32) -> f32 {
    let clip = light_view_proj * vec4<f32>(world_pos, 1.0);
    if (clip.w <= 0.0) {
        return 1.0;
    }
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z < 0.0 || ndc.z > 1.0) {
        return 1.0;
    }
    let texel = globals.shadow_params.x;
    let depth = ndc.z - globals.shadow_params.y;
    var lit = 0.0;
    for (var x: i32 = -1; x <= 1; x = x + 1) {
        for (var y: i32 = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, layer, depth);
        }
    }
    return lit / 9.0;
}

fn cone(cos_theta: f32, cos_outer: f32, cos_inner: f32) -> f32 {
    if (cos_inner - cos_outer < 1e-6) {
        return select(0.0, 1.0, cos_theta >= cos_outer);
    }
    return smoothstep(cos_outer, cos_inner, cos_theta);
}

fn falloff(d: f32, cutoff: f32, decay: f32) -> f32 {
    var f = 1.0 / max(pow(d, decay), 0.01);
    if (cutoff > 0.0) {
        let r = d / cutoff;
        let fade = clamp(1.0 - r * r * r * r, 0.0, 1.0);
        f = f * fade * fade;
    }
    return f;
}

fn direct(
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    shininess: f32,
    n: vec3<f32>,
    v: vec3<f32>,
    l: vec3<f32>,
    radiance: vec3<f32>,
) -> vec3<f32> {
    let n_dot_l = max(dot(n, l), 0.0);
    let h = normalize(l + v);
    let spec = pow(max(dot(n, h), 0.0), shininess) * (shininess + 8.0) / (8.0 * PI);
    return (diffuse / PI + specular * spec) * radiance * n_dot_l;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = in.color.rgb;
    if (in.params.x > 0.5) {
        return vec4<f32>(albedo, in.color.a);
    }

    let n = normalize(in.world_normal);
    let v = normalize(globals.camera_pos.xyz - in.world_pos);
    let roughness = clamp(in.params.y, 0.04, 1.0);
    let metalness = in.params.z;
    let receive = in.params.w > 0.5;

    let diffuse = albedo * (1.0 - metalness);
    let specular = mix(vec3<f32>(0.04), albedo, metalness) * (1.0 - roughness);
    let r4 = roughness * roughness * roughness * roughness;
    let shininess = max(2.0 / r4 - 2.0, 1.0);

    var color = albedo * globals.ambient.rgb;

    if (globals.sun_dir.w > 0.5) {
        let l = -globals.sun_dir.xyz;
        var visible = 1.0;
        if (receive && globals.sun_radiance.w > 0.5) {
            visible = shadow_factor(globals.sun_view_proj, in.world_pos, 1);
        }
        color = color + direct(diffuse, specular, shininess, n, v, l, globals.sun_radiance.rgb) * visible;
    }

    if (globals.spot_pos.w > 0.5) {
        let to_light = globals.spot_pos.xyz - in.world_pos;
        let d = length(to_light);
        let l = to_light / max(d, 1e-4);
        let p = globals.spot_params;
        let atten = cone(dot(-l, globals.spot_dir.xyz), p.z, p.w) * falloff(d, p.x, p.y);
        if (atten > 0.0) {
            var visible = 1.0;
            if (receive && globals.spot_dir.w > 0.5) {
                visible = shadow_factor(globals.spot_view_proj, in.world_pos, 0);
            }
            color = color + direct(diffuse, specular, shininess, n, v, l, globals.spot_radiance.rgb) * atten * visible;
        }
    }

    return vec4<f32>(color, in.color.a);
}
"#;

/// Depth-only pass rendering shadow casters from a light.
pub const SHADOW_SHADER: &str = r#"
struct ShadowUniforms {
    light_view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> shadow: ShadowUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
};

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return shadow.light_view_proj * model * vec4<f32>(vertex.position, 1.0);
}
"#;

/// World-space coloured lines: cube edges and light helpers.
pub const LINE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = globals.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
