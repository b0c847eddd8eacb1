//! Model loading.
//!
//! [`ModelData`] is the CPU side of an imported Wavefront OBJ file: one [`MeshData`] per object
//! with its vertices, indices and material texture paths. [`Model`] uploads it, loading every
//! referenced texture once and sharing it between the meshes that use it.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use fxhash::FxHashMap;
use glam::{Vec2, Vec3};

use crate::{
    abs::{InstanceBuffer, Mesh, ShaderProgram, Texture, TextureOptions, Vertex3D},
    geometry,
};

/// Shininess used when a material does not specify one.
pub const DEFAULT_SHININESS: f32 = 32.0;

/// One mesh of a model, ready to upload.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    pub diffuse_map: Option<PathBuf>,
    pub specular_map: Option<PathBuf>,
    pub shininess: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

impl ModelData {
    /// Imports an OBJ file. Materials are looked up next to it.
    pub fn from_obj_file(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("failed to load model {}: {e}", path.display()))?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_obj_reader(&mut BufReader::new(file), base_dir)
            .map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Imports OBJ text from a reader. `mtllib` references resolve against `base_dir`.
    pub fn from_obj_reader<R: BufRead>(reader: &mut R, base_dir: &Path) -> Result<Self, String> {
        let (models, materials) = tobj::load_obj_buf(reader, &load_options(), |mtl| {
            tobj::load_mtl(base_dir.join(mtl))
        })
        .map_err(|e| format!("failed to parse model: {e}"))?;
        Ok(Self::from_tobj(models, materials, base_dir))
    }

    fn from_tobj(
        models: Vec<tobj::Model>,
        materials: Result<Vec<tobj::Material>, tobj::LoadError>,
        base_dir: &Path,
    ) -> Self {
        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Model materials unavailable: {e}");
            Vec::new()
        });

        let meshes = models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                let material = mesh.material_id.and_then(|id| materials.get(id));
                let texture = |name: &Option<String>| {
                    name.as_ref()
                        .filter(|n| !n.is_empty())
                        .map(|n| base_dir.join(n.replace('\\', "/")))
                };

                let has_normals = mesh.normals.len() == mesh.positions.len();
                let has_tex_coords = mesh.texcoords.len() / 2 == mesh.positions.len() / 3;
                let mut vertices: Vec<Vertex3D> = (0..mesh.positions.len() / 3)
                    .map(|i| Vertex3D {
                        position: Vec3::from_slice(&mesh.positions[i * 3..i * 3 + 3]),
                        normal: if has_normals {
                            Vec3::from_slice(&mesh.normals[i * 3..i * 3 + 3])
                        } else {
                            Vec3::ZERO
                        },
                        tex_coords: if has_tex_coords {
                            Vec2::from_slice(&mesh.texcoords[i * 2..i * 2 + 2])
                        } else {
                            Vec2::ZERO
                        },
                    })
                    .collect();
                if !has_normals {
                    compute_normals(&mut vertices, &mesh.indices);
                }

                MeshData {
                    name: model.name,
                    vertices,
                    indices: mesh.indices,
                    diffuse_map: material.and_then(|m| texture(&m.diffuse_texture)),
                    specular_map: material.and_then(|m| texture(&m.specular_texture)),
                    shininess: material
                        .and_then(|m| m.shininess)
                        .filter(|s| *s > 0.0)
                        .unwrap_or(DEFAULT_SHININESS),
                }
            })
            .collect();

        Self { meshes }
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }
}

/// Fills in smooth vertex normals as the area-weighted sum of the adjacent face normals.
pub fn compute_normals(vertices: &mut [Vertex3D], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = Vec3::ZERO;
    }
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a.max(b).max(c) >= vertices.len() {
            continue;
        }
        // Unnormalized, so larger faces weigh more.
        let n = (vertices[b].position - vertices[a].position)
            .cross(vertices[c].position - vertices[a].position);
        for i in [a, b, c] {
            vertices[i].normal += n;
        }
    }
    for vertex in vertices.iter_mut() {
        vertex.normal = vertex.normal.normalize_or(Vec3::Y);
    }
}

/// A mesh on the GPU plus the textures it samples.
pub struct ModelMesh {
    pub mesh: Mesh,
    pub diffuse: Option<Rc<Texture>>,
    pub specular: Option<Rc<Texture>>,
    pub shininess: f32,
}

/// Returns the cached value for `path`, calling `load` only the first time it is seen.
fn cached<T>(
    cache: &mut FxHashMap<PathBuf, Rc<T>>,
    path: &Path,
    load: impl FnOnce(&Path) -> Result<T, String>,
) -> Result<Rc<T>, String> {
    if let Some(value) = cache.get(path) {
        return Ok(Rc::clone(value));
    }
    let value = Rc::new(load(path)?);
    cache.insert(path.to_path_buf(), Rc::clone(&value));
    Ok(value)
}

/// A drawable model.
pub struct Model {
    meshes: Vec<ModelMesh>,
    default_diffuse: Texture,
    default_specular: Texture,
    textures_loaded: usize,
}

impl Model {
    /// Loads and uploads an OBJ file.
    pub fn load(gl: &Arc<glow::Context>, path: &Path) -> Result<Self, String> {
        let start = std::time::Instant::now();
        let data = ModelData::from_obj_file(path)?;
        let model = Self::from_data(gl, &data)?;
        log::info!(
            "Loaded model {} ({} meshes, {} vertices, {} textures) in {:?}",
            path.display(),
            model.meshes.len(),
            data.vertex_count(),
            model.textures_loaded,
            start.elapsed()
        );
        Ok(model)
    }

    /// Uploads already imported data.
    pub fn from_data(gl: &Arc<glow::Context>, data: &ModelData) -> Result<Self, String> {
        let mut cache: FxHashMap<PathBuf, Rc<Texture>> = FxHashMap::default();
        let mut texture = |path: &Option<PathBuf>| -> Result<Option<Rc<Texture>>, String> {
            path.as_deref()
                .map(|path| {
                    cached(&mut cache, path, |path| {
                        Texture::load_or_fallback(gl, path, TextureOptions::default())
                    })
                })
                .transpose()
        };

        let mut meshes = Vec::with_capacity(data.meshes.len());
        for mesh in &data.meshes {
            log::debug!(
                "Uploading mesh '{}' ({} vertices, {} indices)",
                mesh.name,
                mesh.vertices.len(),
                mesh.indices.len()
            );
            meshes.push(ModelMesh {
                mesh: Mesh::new(gl, &mesh.vertices, &mesh.indices, glow::TRIANGLES)?,
                diffuse: texture(&mesh.diffuse_map)?,
                specular: texture(&mesh.specular_map)?,
                shininess: mesh.shininess,
            });
        }
        let textures_loaded = cache.len();

        Ok(Self {
            meshes,
            default_diffuse: Texture::solid(gl, [200, 200, 200, 255])?,
            default_specular: Texture::solid(gl, [0, 0, 0, 255])?,
            textures_loaded,
        })
    }

    /// The unit cube as a model, for chapters whose asset is missing.
    pub fn cube(gl: &Arc<glow::Context>) -> Result<Self, String> {
        let data = ModelData {
            meshes: vec![MeshData {
                name: "cube".to_string(),
                vertices: geometry::CUBE.to_vec(),
                indices: (0..geometry::CUBE.len() as u32).collect(),
                diffuse_map: None,
                specular_map: None,
                shininess: DEFAULT_SHININESS,
            }],
        };
        Self::from_data(gl, &data)
    }

    /// Loads the model at `path`, or logs why it could not and returns the cube.
    pub fn load_or_cube(gl: &Arc<glow::Context>, path: &Path) -> Result<Self, String> {
        match Self::load(gl, path) {
            Ok(model) => Ok(model),
            Err(e) => {
                log::error!("{e}; drawing a cube instead");
                Self::cube(gl)
            }
        }
    }

    /// Number of distinct texture files uploaded for this model.
    pub fn textures_loaded(&self) -> usize {
        self.textures_loaded
    }

    pub fn meshes(&self) -> &[ModelMesh] {
        &self.meshes
    }

    /// Binds each mesh's diffuse map to unit 0 and specular map to unit 1, then draws it.
    pub fn draw(&self, program: &ShaderProgram) {
        for mesh in &self.meshes {
            self.bind_material(mesh, program);
            mesh.mesh.draw();
        }
    }

    /// Adds per-instance transforms to every mesh of the model.
    pub fn attach_instances(&self, instances: &InstanceBuffer) {
        for mesh in &self.meshes {
            instances.attach(&mesh.mesh);
        }
    }

    /// Draws every mesh `count` times with one instanced call per mesh.
    pub fn draw_instanced(&self, program: &ShaderProgram, count: usize) {
        for mesh in &self.meshes {
            self.bind_material(mesh, program);
            mesh.mesh.draw_instanced(count);
        }
    }

    fn bind_material(&self, mesh: &ModelMesh, program: &ShaderProgram) {
        mesh.diffuse
            .as_deref()
            .unwrap_or(&self.default_diffuse)
            .bind(0);
        mesh.specular
            .as_deref()
            .unwrap_or(&self.default_specular)
            .bind(1);
        program.set_uniform("u_material.diffuse", 0);
        program.set_uniform("u_material.specular", 1);
        program.set_uniform("u_material.shininess", mesh.shininess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
o quad
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 4/4 3/3 2/2 1/1
";

    const TWO_OBJECTS: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
o second
v 0 0 1
v 1 0 1
v 0 1 1
vn 0 0 1
f 4//2 5//2 6//2
";

    fn parse(text: &str) -> ModelData {
        ModelData::from_obj_reader(&mut text.as_bytes(), Path::new("/models/test")).unwrap()
    }

    #[test]
    fn quads_are_triangulated() {
        let data = parse(QUAD_OBJ);
        assert_eq!(data.meshes.len(), 1);
        let mesh = &data.meshes[0];
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.diffuse_map.is_none());
        assert_eq!(mesh.shininess, DEFAULT_SHININESS);
    }

    #[test]
    fn missing_normals_are_generated() {
        let data = parse(QUAD_OBJ);
        for vertex in &data.meshes[0].vertices {
            // Faces listed as 4 3 2 1 wind counter-clockwise seen from above.
            assert!(vertex.normal.abs_diff_eq(Vec3::Y, 1e-5), "{vertex:?}");
        }
    }

    #[test]
    fn tex_coords_follow_positions() {
        let data = parse(QUAD_OBJ);
        for vertex in &data.meshes[0].vertices {
            let expected = Vec2::new(
                (vertex.position.x + 1.0) / 2.0,
                (vertex.position.z + 1.0) / 2.0,
            );
            assert!(vertex.tex_coords.abs_diff_eq(expected, 1e-6));
        }
    }

    #[test]
    fn one_mesh_per_object() {
        let data = parse(TWO_OBJECTS);
        assert_eq!(data.meshes.len(), 2);
        assert_eq!(data.vertex_count(), 6);
        assert_eq!(data.meshes[1].name, "second");
        assert!(data.meshes[1].vertices[0].normal.abs_diff_eq(Vec3::Z, 1e-6));
        assert!(data.meshes.iter().all(|m| m.indices.len() == 3));
    }

    #[test]
    fn compute_normals_weights_by_area() {
        let mut vertices = vec![
            Vertex3D::new([0.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
            Vertex3D::new([4.0, 0.0, 0.0], [0.0; 3], [0.0; 2]),
            Vertex3D::new([0.0, 4.0, 0.0], [0.0; 3], [0.0; 2]),
            Vertex3D::new([0.0, 0.0, 1.0], [0.0; 3], [0.0; 2]),
        ];
        // A big triangle facing +Z and a small one facing +X sharing vertex 0.
        let indices = [0, 1, 2, 0, 2, 3];
        compute_normals(&mut vertices, &indices);
        let shared = vertices[0].normal;
        assert!((shared.length() - 1.0).abs() < 1e-5);
        assert!(shared.z > shared.x);
        assert!(vertices[1].normal.abs_diff_eq(Vec3::Z, 1e-5));
        assert!(vertices[3].normal.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let mut vertices = vec![Vertex3D::default(); 2];
        compute_normals(&mut vertices, &[0, 1, 7]);
        assert!(vertices.iter().all(|v| v.normal == Vec3::Y));
    }

    #[test]
    fn shared_texture_paths_load_once() {
        let data = ModelData {
            meshes: ["a", "b", "c"]
                .into_iter()
                .zip(["wood.png", "wood.png", "metal.png"])
                .map(|(name, map)| MeshData {
                    name: name.to_string(),
                    vertices: Vec::new(),
                    indices: Vec::new(),
                    diffuse_map: Some(PathBuf::from("/models/test").join(map)),
                    specular_map: None,
                    shininess: DEFAULT_SHININESS,
                })
                .collect(),
        };

        let mut cache = FxHashMap::default();
        let mut loads = Vec::new();
        let handles: Vec<Rc<String>> = data
            .meshes
            .iter()
            .map(|mesh| {
                let path = mesh.diffuse_map.as_deref().unwrap();
                cached(&mut cache, path, |path| {
                    loads.push(path.to_path_buf());
                    Ok(path.display().to_string())
                })
                .unwrap()
            })
            .collect();

        assert_eq!(
            loads,
            [
                PathBuf::from("/models/test/wood.png"),
                PathBuf::from("/models/test/metal.png")
            ]
        );
        assert!(Rc::ptr_eq(&handles[0], &handles[1]));
        assert!(!Rc::ptr_eq(&handles[0], &handles[2]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let mut cache: FxHashMap<PathBuf, Rc<u32>> = FxHashMap::default();
        let path = Path::new("missing.png");
        assert!(cached(&mut cache, path, |_| Err("gone".to_string())).is_err());
        assert!(cache.is_empty());
        assert_eq!(*cached(&mut cache, path, |_| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn material_textures_resolve_next_to_the_model() {
        let dir = std::env::temp_dir().join(format!("learnopengl-model-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("box.mtl"),
            "newmtl wood\nNs 64\nmap_Kd textures/wood.png\nmap_Ks textures/wood_spec.png\n",
        )
        .unwrap();

        let obj = "mtllib box.mtl\no box\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl wood\nf 1 2 3\n";
        let data = ModelData::from_obj_reader(&mut obj.as_bytes(), &dir).unwrap();
        let mesh = &data.meshes[0];
        assert_eq!(mesh.diffuse_map, Some(dir.join("textures/wood.png")));
        assert_eq!(mesh.specular_map, Some(dir.join("textures/wood_spec.png")));
        assert_eq!(mesh.shininess, 64.0);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn garbage_is_rejected() {
        let err = ModelData::from_obj_reader(&mut "v 1 x 3\n".as_bytes(), Path::new("."));
        assert!(err.is_err());
    }
}
