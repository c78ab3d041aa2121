pub(crate) const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_view_proj;
uniform mat4 u_model;

out vec3 v_normal;
out float v_height;

void main() {
    vec4 world_pos = u_model * vec4(a_position, 1.0);
    gl_Position = u_view_proj * world_pos;
    v_normal = mat3(u_model) * a_normal;
    v_height = world_pos.y;
}
"#;

pub(crate) const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform vec3 u_light_dir;
uniform vec4 u_light_color;

in vec3 v_normal;
in float v_height;

out vec4 out_color;

void main() {
    vec3 normal = normalize(v_normal);
    float diffuse = max(dot(normal, u_light_dir), 0.0);
    float ambient = 0.2;
    float intensity = u_light_color.w;
    // Deep water reads darker blue, shallow rims lighter.
    float depth = clamp(v_height / 6.0, 0.0, 1.0);
    vec3 water = mix(vec3(0.05, 0.25, 0.55), vec3(0.55, 0.8, 0.95), depth);
    vec3 lit = (ambient + diffuse * intensity) * water * u_light_color.rgb;
    out_color = vec4(lit, 1.0);
}
"#;

pub(crate) const CLEAR_COLOR: [f32; 4] = [0.02, 0.02, 0.04, 1.0];
