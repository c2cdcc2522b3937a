use criterion::{criterion_group, criterion_main, Criterion, black_box};

use satin::parameters::{Parameter, ParameterGroup};
use satin::buffers::UniformBuffer;

use glam::{IVec3, Mat3, Mat4, Vec2, Vec3, Vec4};

fn material_group() -> ParameterGroup {
    ParameterGroup::with_params(
        "material",
        vec![
            Parameter::bool("lit", true),
            Parameter::float("roughness", 0.35),
            Parameter::float("metallic", 0.05),
            Parameter::float2("uv_scale", Vec2::splat(1.0)),
            Parameter::float3("emission", Vec3::new(0.1, 0.2, 0.3)),
            Parameter::float4("albedo", Vec4::new(0.8, 0.7, 0.6, 1.0)),
            Parameter::int3("tile", IVec3::new(4, 4, 1)),
            Parameter::packed_float3("wind", Vec3::X),
            Parameter::float3x3("normal_matrix", Mat3::IDENTITY),
            Parameter::float4x4("model", Mat4::IDENTITY),
        ],
    )
}

fn bench_group_size(c: &mut Criterion) {
    c.bench_function("group_size_cold", |b| {
        b.iter(|| {
            let group = material_group();
            black_box(group.size())
        });
    });
}

fn bench_write_packed(c: &mut Criterion) {
    let group = material_group();
    let mut region = vec![0u8; group.size()];

    c.bench_function("group_write_packed", |b| {
        b.iter(|| {
            group.write_packed(black_box(&mut region));
        });
    });
}

fn bench_read_packed(c: &mut Criterion) {
    let group = material_group();
    let mut region = vec![0u8; group.size()];
    group.write_packed(&mut region);

    c.bench_function("group_read_packed", |b| {
        b.iter(|| {
            group.read_packed(black_box(&region));
        });
    });
}

fn bench_uniform_update(c: &mut Criterion) {
    let mut uniforms = UniformBuffer::new(material_group());

    c.bench_function("uniform_update_clean", |b| {
        b.iter(|| {
            uniforms.update();
            black_box(uniforms.offset());
        });
    });
}

fn bench_uniform_update_dirty(c: &mut Criterion) {
    let mut uniforms = UniformBuffer::new(material_group());

    c.bench_function("uniform_update_dirty", |b| {
        let mut frame = 0.0f32;
        b.iter(|| {
            frame += 0.016;
            uniforms.parameters().set("roughness", frame.fract());
            uniforms.update();
            black_box(uniforms.offset());
        });
    });
}

fn bench_struct_string(c: &mut Criterion) {
    let group = material_group();

    c.bench_function("group_struct_string", |b| {
        b.iter(|| {
            black_box(group.struct_string());
        });
    });
}

criterion_group!(
    benches,
    bench_group_size,
    bench_write_packed,
    bench_read_packed,
    bench_uniform_update,
    bench_uniform_update_dirty,
    bench_struct_string,
);
criterion_main!(benches);
