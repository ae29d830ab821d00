use crate::constants::chunk::{cell_index, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::constants::thermal::{
    CELL_PITCH_METERS, MAX_TEMPERATURE, MIN_TEMPERATURE, MIN_THERMAL_CAPACITY,
};
use crate::world::{section_y_range, Chunk, World};

/// The six axis-aligned offsets of the conduction stencil
const STENCIL: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

const INV_PITCH_SQ: f32 = 1.0 / (CELL_PITCH_METERS * CELL_PITCH_METERS);

/// Advance one 16^3 section of `chunk` by a single explicit
/// finite-difference conduction step, reading front buffers (the
/// origin's and, through [`World::sample_neighbor`], its neighbors')
/// and writing only `back`.
///
/// Per cell: void copies its front value through unchanged; everything
/// else accumulates flux from each existing neighbor with the
/// harmonic-mean interface conductivity, then applies the forward-Euler
/// update scaled by the cell's thermal capacity, clamped to the global
/// temperature bounds. Missing neighbors (world edge, column top or
/// bottom) contribute zero flux, which makes the boundary adiabatic;
/// void neighbors contribute zero flux because their conductivity is 0.
pub(crate) fn simulate_section(
    world: &World,
    chunk: &Chunk,
    back: &mut [f32],
    sy: usize,
    dt_seconds: f32,
) {
    let table = world.materials();
    let cell_materials = chunk.materials();
    let front = chunk.front();
    let masses = chunk.masses();
    let void = chunk.void_id();

    for z in 0..CHUNK_SIZE_Z {
        for y in section_y_range(sy) {
            for x in 0..CHUNK_SIZE_X {
                let i = cell_index(x, y, z);
                let material_id = cell_materials[i];
                if material_id == void {
                    back[i] = front[i];
                    continue;
                }

                let material = table.get(material_id);
                let capacity = (masses[i] * material.heat_capacity).max(MIN_THERMAL_CAPACITY);
                let here = front[i];

                let mut flux = 0.0f32;
                for (dx, dy, dz) in STENCIL {
                    let neighbor = world.sample_neighbor(chunk, x, y, z, dx, dy, dz);
                    if !neighbor.exists {
                        continue;
                    }
                    let other = table.get(neighbor.material);
                    let k_eff = if material.conductivity <= 0.0 || other.conductivity <= 0.0 {
                        0.0
                    } else {
                        2.0 * material.conductivity * other.conductivity
                            / (material.conductivity + other.conductivity)
                    };
                    flux += k_eff * (neighbor.temperature - here) * INV_PITCH_SQ;
                }

                back[i] = (here + (dt_seconds / capacity) * flux)
                    .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
            }
        }
    }
}
