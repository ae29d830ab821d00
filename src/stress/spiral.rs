use crate::world::ChunkPos;

/// Clockwise square spiral walk over chunk coordinates.
///
/// Starting at (0,0) the cursor visits (1,0), (1,1), (0,1), (-1,1),
/// (-1,0), (-1,-1), (0,-1), (1,-1), (2,-1), and so on. The leg length grows
/// by one after every two legs (1,1,2,2,3,3,...), which tiles the plane
/// outward ring by ring.
#[derive(Debug, Clone)]
pub struct SpiralCursor {
    x: i32,
    z: i32,
    /// 0 = +x, 1 = +z, 2 = -x, 3 = -z
    dir: u8,
    leg_len: u32,
    steps_on_leg: u32,
    legs_at_len: u32,
}

impl SpiralCursor {
    pub fn new() -> Self {
        Self {
            x: 0,
            z: 0,
            dir: 0,
            leg_len: 1,
            steps_on_leg: 0,
            legs_at_len: 0,
        }
    }

    /// The position the cursor currently rests on
    pub fn position(&self) -> ChunkPos {
        ChunkPos::new(self.x, self.z)
    }

    /// Take one step and return the new position.
    pub fn advance(&mut self) -> ChunkPos {
        match self.dir {
            0 => self.x += 1,
            1 => self.z += 1,
            2 => self.x -= 1,
            _ => self.z -= 1,
        }
        self.steps_on_leg += 1;
        if self.steps_on_leg >= self.leg_len {
            self.steps_on_leg = 0;
            self.dir = (self.dir + 1) & 3;
            self.legs_at_len += 1;
            if self.legs_at_len == 2 {
                self.legs_at_len = 0;
                self.leg_len += 1;
            }
        }
        self.position()
    }
}

impl Default for SpiralCursor {
    fn default() -> Self {
        Self::new()
    }
}
