use std::{ffi::c_void, mem::size_of, ptr};

const POS_ATTRIB_INDEX: u32 = 0;
const COLOR_ATTRIB_INDEX: u32 = 1;
const TEXCOORDS_ATTRIB_INDEX: u32 = 2;

/// Floats per vertex: position (3) + color (3) + texcoords (2).
const VERTEX_STRIDE: usize = 8;

/// An indexed mesh with the tutorial's interleaved vertex layout, uploaded
/// to its own VAO. Vertex data comes from the caller.
pub struct Quad {
    vao: u32,
    vbo: u32,
    ebo: u32,
    index_count: i32,
}

impl Quad {
    pub fn new(vertices: &[f32], indices: &[u32]) -> Self {
        assert!(vertices.len() % VERTEX_STRIDE == 0);

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = 0;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            gl::GenBuffers(1, &mut vbo);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (vertices.len() * size_of::<f32>()) as isize,
                vertices.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            gl::GenBuffers(1, &mut ebo);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                (indices.len() * size_of::<u32>()) as isize,
                indices.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            let stride = (VERTEX_STRIDE * size_of::<f32>()) as i32;

            gl::VertexAttribPointer(POS_ATTRIB_INDEX, 3, gl::FLOAT, gl::FALSE, stride, ptr::null());
            gl::EnableVertexAttribArray(POS_ATTRIB_INDEX);

            gl::VertexAttribPointer(
                COLOR_ATTRIB_INDEX,
                3,
                gl::FLOAT,
                gl::FALSE,
                stride,
                (3 * size_of::<f32>()) as *const c_void,
            );
            gl::EnableVertexAttribArray(COLOR_ATTRIB_INDEX);

            gl::VertexAttribPointer(
                TEXCOORDS_ATTRIB_INDEX,
                2,
                gl::FLOAT,
                gl::FALSE,
                stride,
                (6 * size_of::<f32>()) as *const c_void,
            );
            gl::EnableVertexAttribArray(TEXCOORDS_ATTRIB_INDEX);

            gl::BindVertexArray(0);
        }

        Self {
            vao,
            vbo,
            ebo,
            index_count: indices.len() as i32,
        }
    }

    pub fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawElements(
                gl::TRIANGLES,
                self.index_count,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
        }
    }

    pub fn delete(self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ebo);
        }
    }
}
