//! Integration tests for binding resources against a recording device.

use glam::Vec3;
use hamlet_resources::primitives::{unit_cube_data, CUBE_VERTEX_COUNT, MeshVertex};
use hamlet_resources::{
    BindState, Material, MaterialId, Shader, ShaderFeatures, ShaderId, Shape, ShapeId,
};
use hamlet_rhi::{GpuCommand, GpuDevice, HeadlessDevice, PrimitiveTopology, UniformValue};

const VERT: &str = "
    uniform mat4 u_transform;
    uniform mat4 u_normTransform;
    uniform float u_uvWeight;
    attribute vec4 a_pos;
    attribute vec3 a_normal;
    attribute vec2 a_uv;
    attribute vec2 a_uv2;
    void main() {}
";
const FRAG: &str = "
    precision mediump float;
    uniform vec3 u_color;
    uniform sampler2D u_texture;
    void main() {}
";

#[test]
fn test_cube_binds_in_order() {
    let mut device = HeadlessDevice::new();
    let mut shader = Shader::new(&mut device, ShaderId(0), VERT, FRAG).unwrap();
    shader.set_features(ShaderFeatures::default() | ShaderFeatures::UV2);
    let mut material = Material::new(MaterialId(0), ShaderId(0));
    material.set_color(Vec3::new(0.5, 0.25, 1.0)).set_texture_unit(0);
    let mut cube = Shape::new(
        &mut device,
        ShapeId(0),
        MeshVertex::LAYOUT,
        PrimitiveTopology::Triangles,
        &unit_cube_data(),
    )
    .unwrap();
    assert_eq!(cube.vertex_count() as usize, CUBE_VERTEX_COUNT);

    let mut state = BindState::new();
    let switched = material.pre_draw(&mut device, &mut shader, &mut state);
    cube.pre_draw(&mut device, switched, &mut shader, &mut state);
    device.draw_arrays(cube.topology(), 0, cube.vertex_count());

    let commands = device.commands();
    assert!(matches!(commands[0], GpuCommand::UseProgram(_)));
    assert!(matches!(
        commands.last(),
        Some(GpuCommand::DrawArrays {
            topology: PrimitiveTopology::Triangles,
            first: 0,
            count: 36,
            ..
        })
    ));
    assert_eq!(
        device.attribute_bindings(),
        vec!["a_pos", "a_normal", "a_uv", "a_uv2"]
    );
    assert_eq!(
        device.last_uniform("u_color"),
        Some(UniformValue::Vec3(Vec3::new(0.5, 0.25, 1.0)))
    );
    assert_eq!(device.last_uniform("u_texture"), Some(UniformValue::Int(0)));
}

#[test]
fn test_second_frame_is_draw_only() {
    let mut device = HeadlessDevice::new();
    let mut shader = Shader::new(&mut device, ShaderId(0), VERT, FRAG).unwrap();
    let mut material = Material::new(MaterialId(0), ShaderId(0));
    let mut cube = Shape::new(
        &mut device,
        ShapeId(0),
        MeshVertex::LAYOUT,
        PrimitiveTopology::Triangles,
        &unit_cube_data(),
    )
    .unwrap();
    let mut state = BindState::new();

    for _ in 0..2 {
        device.clear();
        let switched = material.pre_draw(&mut device, &mut shader, &mut state);
        cube.pre_draw(&mut device, switched, &mut shader, &mut state);
        device.draw_arrays(cube.topology(), 0, cube.vertex_count());
    }

    assert_eq!(device.commands().len(), 1);
    assert_eq!(device.draw_calls().len(), 1);
}
