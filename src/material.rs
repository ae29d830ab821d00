/// Index of a material in the [`MaterialTable`].
///
/// Cells store this 16-bit index instead of the material itself to keep
/// the per-chunk arrays compact. Index 0 is reserved for void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u16);

impl MaterialId {
    /// The reserved void material (empty cell, all constants zero)
    pub const VOID: MaterialId = MaterialId(0);
}

/// Physical constants for one cell material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Specific heat capacity, J/(kg*K)
    pub heat_capacity: f32,
    /// Thermal conductivity, W/(m*K). 0 = perfect insulator.
    pub conductivity: f32,
    /// Default mass for a 1 m^3 cell, kg
    pub default_mass: f32,
    /// Molar mass, kg/mol. Not read by the conduction kernel.
    pub molar_mass: f32,
}

impl Material {
    /// The void material: zero capacity, zero conductivity, zero mass.
    pub const VOID: Material = Material {
        heat_capacity: 0.0,
        conductivity: 0.0,
        default_mass: 0.0,
        molar_mass: 0.0,
    };

    pub fn new(heat_capacity: f32, conductivity: f32, default_mass: f32, molar_mass: f32) -> Self {
        Self {
            heat_capacity,
            conductivity,
            default_mass,
            molar_mass,
        }
    }
}

/// Append-only registry mapping a [`MaterialId`] to its constants.
///
/// Once issued, an index never moves and is never invalidated. Writers
/// must hold the world lock; readers are safe alongside each other.
/// Consumers cache indices, not references.
pub struct MaterialTable {
    entries: Vec<Material>,
}

impl MaterialTable {
    /// Empty table. Most callers want [`MaterialTable::with_void`] so
    /// that index 0 carries the reserved void entry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Table pre-seeded with [`Material::VOID`] at index 0.
    pub fn with_void() -> Self {
        let mut table = Self::new();
        table.add(Material::VOID);
        table
    }

    /// Append a material and return its new index.
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.entries.len() as u16);
        self.entries.push(material);
        id
    }

    /// Look up a material by index. An out-of-range index is a
    /// programmer error: the public API never issues one.
    #[inline]
    pub fn get(&self, id: MaterialId) -> &Material {
        debug_assert!(
            (id.0 as usize) < self.entries.len(),
            "material index {} out of range (table size {})",
            id.0,
            self.entries.len()
        );
        &self.entries[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::with_void()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_is_index_zero() {
        let table = MaterialTable::with_void();
        assert_eq!(table.len(), 1);
        assert_eq!(*table.get(MaterialId::VOID), Material::VOID);
    }

    #[test]
    fn test_add_returns_sequential_ids() {
        let mut table = MaterialTable::with_void();
        let stone = table.add(Material::new(790.0, 2.5, 2600.0, 0.06));
        let iron = table.add(Material::new(450.0, 80.0, 7800.0, 0.055));
        assert_eq!(stone, MaterialId(1));
        assert_eq!(iron, MaterialId(2));
        assert_eq!(table.get(iron).conductivity, 80.0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_indices_stable_across_growth() {
        let mut table = MaterialTable::with_void();
        let first = table.add(Material::new(500.0, 100.0, 1000.0, 0.0));
        let before = *table.get(first);
        for i in 0..100 {
            table.add(Material::new(i as f32, 1.0, 1.0, 0.0));
        }
        assert_eq!(*table.get(first), before);
    }
}
