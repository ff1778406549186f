//! Indexed triangle soup used as navmesh input and debug output

use crate::{Error, Result};
use glam::Vec3;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// An indexed triangle list.
///
/// `vertices` holds `[x, y, z]` triples and `indices` holds one vertex index
/// per triangle corner. Winding is significant: a triangle `(a, b, c)` whose
/// normal `(b - a) x (c - a)` points to +Y is an upward, walkable surface.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TriangleSoup {
    /// Flat vertex positions, 3 floats per vertex
    pub vertices: Vec<f32>,
    /// Triangle corners, 3 indices per triangle
    pub indices: Vec<i32>,
}

impl TriangleSoup {
    /// Creates a new empty soup
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Returns the position of vertex `i`
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.vertices[i * 3..i * 3 + 3])
    }

    /// Returns the three corner indices of triangle `i`
    pub fn triangle_indices(&self, i: usize) -> [i32; 3] {
        [
            self.indices[i * 3],
            self.indices[i * 3 + 1],
            self.indices[i * 3 + 2],
        ]
    }

    /// Returns the three corner positions of triangle `i`
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangle_indices(i);
        [
            self.vertex(a as usize),
            self.vertex(b as usize),
            self.vertex(c as usize),
        ]
    }

    /// Iterates over all triangles as corner positions
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Appends a vertex and returns its index
    pub fn push_vertex(&mut self, v: Vec3) -> i32 {
        let index = self.vertex_count() as i32;
        self.vertices.extend_from_slice(&[v.x, v.y, v.z]);
        index
    }

    /// Appends a triangle referencing existing vertices
    pub fn push_triangle(&mut self, a: i32, b: i32, c: i32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Returns a copy with every vertex moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        let vertices = self
            .vertices
            .chunks_exact(3)
            .flat_map(|v| [v[0] + offset.x, v[1] + offset.y, v[2] + offset.z])
            .collect();
        Self {
            vertices,
            indices: self.indices.clone(),
        }
    }

    /// Builds an indexed soup from a flat, non-indexed triangle vertex buffer
    /// (9 floats per triangle)
    pub fn from_triangle_vertices(flat: &[f32]) -> Self {
        let vertex_count = flat.len() / 3;
        let usable = vertex_count - vertex_count % 3;
        Self {
            vertices: flat[..usable * 3].to_vec(),
            indices: (0..usable as i32).collect(),
        }
    }

    /// Checks buffer alignment and index ranges
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let vertex_count = self.vertex_count() as i32;
        if let Some(bad) = self
            .indices
            .iter()
            .find(|&&i| i < 0 || i >= vertex_count)
        {
            return Err(Error::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(())
    }

    /// Calculates the axis-aligned bounding box of the soup
    pub fn calculate_bounds(&self) -> (Vec3, Vec3) {
        if self.vertex_count() == 0 {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        let mut bmin = Vec3::splat(f32::MAX);
        let mut bmax = Vec3::splat(f32::MIN);
        for v in self.vertices.chunks_exact(3) {
            let p = Vec3::new(v[0], v[1], v[2]);
            bmin = bmin.min(p);
            bmax = bmax.max(p);
        }
        (bmin, bmax)
    }

    /// Loads a soup from an OBJ file
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut soup = Self::new();
        for line in reader.lines() {
            let line = line?;
            Self::parse_obj_line(&line, &mut soup)?;
        }
        Ok(soup)
    }

    /// Parses OBJ content from a string
    ///
    /// # Example
    ///
    /// ```
    /// use mazenav_common::TriangleSoup;
    ///
    /// let obj = "v 0 0 0\nv 1 0 0\nv 1 0 1\nf 1 3 2\n";
    /// let soup = TriangleSoup::from_obj_str(obj).unwrap();
    /// assert_eq!(soup.vertex_count(), 3);
    /// assert_eq!(soup.triangle_count(), 1);
    /// ```
    pub fn from_obj_str(content: &str) -> Result<Self> {
        let mut soup = Self::new();
        for line in content.lines() {
            Self::parse_obj_line(line, &mut soup)?;
        }
        Ok(soup)
    }

    fn parse_obj_line(line: &str, soup: &mut Self) -> Result<()> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f32> {
                    tokens
                        .next()
                        .ok_or_else(|| {
                            Error::InvalidMesh(format!("Invalid vertex: missing {} coordinate", axis))
                        })?
                        .parse::<f32>()
                        .map_err(|_| {
                            Error::InvalidMesh(format!(
                                "Invalid vertex: {} coordinate is not a number",
                                axis
                            ))
                        })
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                soup.vertices.extend_from_slice(&[x, y, z]);
            }
            Some("f") => {
                let mut face = Vec::new();
                for token in tokens {
                    let index_str = token.split('/').next().unwrap_or_default();
                    let index = index_str.parse::<i32>().map_err(|_| {
                        Error::InvalidMesh("Invalid face: vertex index is not a number".to_string())
                    })? - 1; // OBJ indices are 1-based
                    face.push(index);
                }

                if face.len() < 3 {
                    return Err(Error::InvalidMesh(
                        "Invalid face: less than 3 vertices".to_string(),
                    ));
                }

                // Fan triangulation keeps the face winding
                for i in 1..face.len() - 1 {
                    soup.push_triangle(face[0], face[i], face[i + 1]);
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Serializes the soup as Wavefront OBJ text
    pub fn to_obj_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# {} vertices, {} triangles\n",
            self.vertex_count(),
            self.triangle_count()
        ));
        for v in self.vertices.chunks_exact(3) {
            out.push_str(&format!("v {} {} {}\n", v[0], v[1], v[2]));
        }
        for t in self.indices.chunks_exact(3) {
            out.push_str(&format!("f {} {} {}\n", t[0] + 1, t[1] + 1, t[2] + 1));
        }
        out
    }

    /// Writes the soup to an OBJ file
    pub fn write_obj<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_obj_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_obj_str_quad_triangulation() {
        let obj = r#"
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 0.0 1.0
v 0.0 0.0 1.0
f 1 2 3 4
"#;
        let soup = TriangleSoup::from_obj_str(obj).unwrap();
        assert_eq!(soup.vertex_count(), 4);
        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_from_obj_str_skips_normals_and_comments() {
        let obj = r#"
# comment
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.5 0.0 1.0
vn 0.0 1.0 0.0
f 1//1 3//1 2//1
"#;
        let soup = TriangleSoup::from_obj_str(obj).unwrap();
        assert_eq!(soup.triangle_count(), 1);
        assert_eq!(soup.triangle_indices(0), [0, 2, 1]);
    }

    #[test]
    fn test_from_obj_str_invalid_vertex() {
        assert!(TriangleSoup::from_obj_str("v 0.0 0.0").is_err());
        assert!(TriangleSoup::from_obj_str("v 0.0 x 1.0").is_err());
    }

    #[test]
    fn test_obj_text_reloads() {
        let mut soup = TriangleSoup::new();
        let a = soup.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        let b = soup.push_vertex(Vec3::new(1.0, 0.5, 0.0));
        let c = soup.push_vertex(Vec3::new(0.0, 0.0, 1.0));
        soup.push_triangle(a, c, b);

        let reloaded = TriangleSoup::from_obj_str(&soup.to_obj_string()).unwrap();
        assert_eq!(reloaded, soup);
    }

    #[test]
    fn test_validate_rejects_bad_buffers() {
        let misaligned = TriangleSoup {
            vertices: vec![0.0; 4],
            indices: vec![0, 0, 0],
        };
        assert!(misaligned.validate().is_err());

        let dangling = TriangleSoup {
            vertices: vec![0.0; 9],
            indices: vec![0, 1, 3],
        };
        assert!(dangling.validate().is_err());
    }

    #[test]
    fn test_bounds_and_translation() {
        let mut soup = TriangleSoup::new();
        soup.push_vertex(Vec3::new(-1.0, 0.0, 2.0));
        soup.push_vertex(Vec3::new(3.0, 0.5, -2.0));
        let (bmin, bmax) = soup.calculate_bounds();
        assert_eq!(bmin, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bmax, Vec3::new(3.0, 0.5, 2.0));

        let lifted = soup.translated(Vec3::Y);
        assert_eq!(lifted.vertex(0), Vec3::new(-1.0, 1.0, 2.0));
    }

    #[test]
    fn test_from_triangle_vertices_drops_partial_triangle() {
        let flat = vec![0.0; 9 * 2 + 3];
        let soup = TriangleSoup::from_triangle_vertices(&flat);
        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.vertex_count(), 6);
    }
}
