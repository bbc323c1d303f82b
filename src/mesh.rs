use wgpu::util::DeviceExt;

/// Host-side triangle-list mesh: one position and one color per vertex, the
/// two arrays index-aligned.
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl Mesh {
    /// Panics if the arrays disagree in length; every vertex carries exactly
    /// one color.
    pub fn new(positions: Vec<[f32; 3]>, colors: Vec<[f32; 3]>) -> Self {
        assert_eq!(
            positions.len(),
            colors.len(),
            "mesh position and color arrays must be index-aligned"
        );
        Self { positions, colors }
    }

    /// The built-in square pyramid: four side faces sharing the apex plus a
    /// two-triangle base, 18 vertices, centered on the origin.
    pub fn pyramid() -> Self {
        Self::new(PYRAMID_POSITIONS.to_vec(), PYRAMID_COLORS.to_vec())
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.vertex_count() / 3
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }
}

const PYRAMID_POSITIONS: [[f32; 3]; 18] = [
    // front face
    [-0.5, -0.5, 0.5],
    [0.0, 0.5, 0.0],
    [0.5, -0.5, 0.5],
    // right face
    [0.5, -0.5, 0.5],
    [0.0, 0.5, 0.0],
    [0.5, -0.5, -0.5],
    // back face
    [0.5, -0.5, -0.5],
    [0.0, 0.5, 0.0],
    [-0.5, -0.5, -0.5],
    // left face
    [-0.5, -0.5, -0.5],
    [0.0, 0.5, 0.0],
    [-0.5, -0.5, 0.5],
    // base, first half
    [-0.5, -0.5, 0.5],
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, 0.5],
    // base, second half
    [0.5, -0.5, 0.5],
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
];

// One color per base corner (the apex gets its own); shared corners repeat
// the same color so the faces shade continuously.
const PYRAMID_COLORS: [[f32; 3]; 18] = [
    // front face
    [0.266, 0.133, 0.533],
    [0.709, 0.827, 0.239],
    [0.423, 0.635, 0.917],
    // right face
    [0.423, 0.635, 0.917],
    [0.709, 0.827, 0.239],
    [0.921, 0.490, 0.356],
    // back face
    [0.921, 0.490, 0.356],
    [0.709, 0.827, 0.239],
    [0.996, 0.823, 0.247],
    // left face
    [0.996, 0.823, 0.247],
    [0.709, 0.827, 0.239],
    [0.266, 0.133, 0.533],
    // base, first half
    [0.266, 0.133, 0.533],
    [0.996, 0.823, 0.247],
    [0.423, 0.635, 0.917],
    // base, second half
    [0.423, 0.635, 0.917],
    [0.996, 0.823, 0.247],
    [0.921, 0.490, 0.356],
];

/// Device-side copy of a [`Mesh`]: positions in vertex slot 0, colors in
/// slot 1, both tightly packed.
pub struct GpuMesh {
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![0 => Float32x3];
    const COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

    pub fn upload(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Position Buffer"),
            contents: bytemuck::cast_slice(mesh.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Color Buffer"),
            contents: bytemuck::cast_slice(mesh.colors()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            position_buffer,
            color_buffer,
            vertex_count: mesh.vertex_count(),
        }
    }

    /// Vertex slot 0: positions as packed `vec3<f32>` records, zero offset.
    pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::POSITION_ATTRIBUTES,
        }
    }

    /// Vertex slot 1: colors, same packing as the positions.
    pub fn color_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::COLOR_ATTRIBUTES,
        }
    }

    pub fn position_buffer(&self) -> &wgpu::Buffer {
        &self.position_buffer
    }

    pub fn color_buffer(&self) -> &wgpu::Buffer {
        &self.color_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_is_six_triangles() {
        let mesh = Mesh::pyramid();
        assert_eq!(mesh.vertex_count(), 18);
        assert_eq!(mesh.triangle_count(), 6);
    }

    #[test]
    fn position_and_color_arrays_stay_parallel() {
        let mesh = Mesh::pyramid();
        assert_eq!(mesh.positions().len(), mesh.colors().len());
        // 18 vertices × 3 components = 54 scalars = 216 bytes per buffer.
        assert_eq!(mesh.positions().len() * 3, 54);
        assert_eq!(bytemuck::cast_slice::<_, u8>(mesh.positions()).len(), 216);
        assert_eq!(bytemuck::cast_slice::<_, u8>(mesh.colors()).len(), 216);
    }

    #[test]
    fn pyramid_shares_one_apex_across_side_faces() {
        let mesh = Mesh::pyramid();
        let apex_uses = mesh
            .positions()
            .iter()
            .filter(|p| **p == [0.0, 0.5, 0.0])
            .count();
        assert_eq!(apex_uses, 4);
        // Every other vertex lies in the base plane.
        assert!(mesh
            .positions()
            .iter()
            .filter(|p| **p != [0.0, 0.5, 0.0])
            .all(|p| p[1] == -0.5));
    }

    #[test]
    #[should_panic(expected = "index-aligned")]
    fn mismatched_color_array_is_rejected() {
        Mesh::new(vec![[0.0; 3]; 3], vec![[0.0; 3]; 2]);
    }

    #[test]
    fn vertex_slots_are_tightly_packed_vec3() {
        let position = GpuMesh::position_layout();
        assert_eq!(position.array_stride, 12);
        assert_eq!(position.attributes.len(), 1);
        assert_eq!(position.attributes[0].shader_location, 0);
        assert_eq!(position.attributes[0].offset, 0);
        assert_eq!(position.attributes[0].format, wgpu::VertexFormat::Float32x3);

        let color = GpuMesh::color_layout();
        assert_eq!(color.array_stride, 12);
        assert_eq!(color.attributes.len(), 1);
        assert_eq!(color.attributes[0].shader_location, 1);
        assert_eq!(color.attributes[0].offset, 0);
        assert_eq!(color.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }
}
