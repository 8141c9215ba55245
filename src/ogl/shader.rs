use std::ffi::CString;
use std::{fmt, fs};

use gl::types::GLenum;
use glam::{Mat4, Vec3};
use log::error;
use thiserror::Error;

/// Upper bound on the driver info log fetched for a failed compile / link.
const INFO_LOG_LEN: usize = 512;

/// One half of a shader program, compiled independently before linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    fn gl_enum(self) -> GLenum {
        match self {
            StageKind::Vertex => gl::VERTEX_SHADER,
            StageKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StageKind::Vertex => write!(f, "VERTEX"),
            StageKind::Fragment => write!(f, "FRAGMENT"),
        }
    }
}

/// A failure observed while building a program. The Display impl is the
/// exact diagnostic line emitted to the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("ERROR::SHADER::FILE_NOT_SUCCESSFULLY_READ:{path}")]
    FileRead { path: String },
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{log}")]
    Compile { stage: StageKind, log: String },
    #[error("ERROR::SHADER::PROGRAM::LINKING_FAILED\n{log}")]
    Link { log: String },
}

/// Outcome of a program build, queryable via [`ShaderProgram::status`].
/// Carries the first failure on the source -> compile -> link path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Ready,
    Failed(BuildError),
}

impl BuildStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BuildStatus::Ready)
    }
}

/// A compiled shader stage, owned by the builder until it is attached to a
/// program at link time.
pub struct CompiledStage {
    pub id: u32,
    #[allow(unused)]
    pub kind: StageKind,
    error: Option<BuildError>,
}

impl CompiledStage {
    #[allow(unused)]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A linked OpenGL shader program.
///
/// Every build path hands back a program handle, even when a stage failed to
/// compile or the link failed; the failure is logged at the point it occurs
/// and recorded in [`status`](Self::status). Call sites that never check the
/// status get the original behavior: a broken shader draws garbage instead of
/// aborting the frame loop.
#[derive(Debug)]
pub struct ShaderProgram {
    pub id: u32,
    status: BuildStatus,
}

/// Reads a shader source file. On any I/O failure the diagnostic names the
/// path and an empty source is returned; the empty source then fails
/// compilation downstream instead of aborting here.
pub fn load_source(path: &str) -> String {
    read_source(path).0
}

fn read_source(path: &str) -> (String, Option<BuildError>) {
    match fs::read_to_string(path) {
        Ok(src) => (src, None),
        Err(_) => {
            let e = BuildError::FileRead {
                path: path.to_owned(),
            };
            error!("{e}");
            (String::new(), Some(e))
        }
    }
}

/// Compiles a single stage. A handle is allocated and returned regardless of
/// whether compilation succeeded; the failure, if any, travels with it.
pub fn compile_stage(src: &str, kind: StageKind) -> CompiledStage {
    unsafe {
        let id = gl::CreateShader(kind.gl_enum());
        let src_ptr = src.as_ptr() as *const _;
        let src_len = src.len() as i32;
        gl::ShaderSource(id, 1, &src_ptr, &src_len);
        gl::CompileShader(id);

        let mut res = 0;
        gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut res);

        let error = if res == 0 {
            let mut info_log = [0u8; INFO_LOG_LEN];
            let mut info_len = 0;
            gl::GetShaderInfoLog(
                id,
                INFO_LOG_LEN as i32,
                &mut info_len,
                info_log.as_mut_ptr() as _,
            );
            let log = info_log_to_string(&info_log, info_len);
            let e = BuildError::Compile { stage: kind, log };
            error!("{e}");
            Some(e)
        } else {
            None
        };

        CompiledStage { id, kind, error }
    }
}

/// Links two compiled stages into a program. Both stages are attached and the
/// link attempted regardless of their compile status, matching the
/// unconditional pipeline; the stage handles are deleted afterwards either
/// way. The resulting status is the first failure seen, or `Ready`.
pub fn link_program(vertex: CompiledStage, fragment: CompiledStage) -> ShaderProgram {
    let stage_failure = vertex.error.clone().or_else(|| fragment.error.clone());

    unsafe {
        let id = gl::CreateProgram();
        gl::AttachShader(id, vertex.id);
        gl::AttachShader(id, fragment.id);
        gl::LinkProgram(id);

        let mut res = 0;
        gl::GetProgramiv(id, gl::LINK_STATUS, &mut res);

        let link_failure = if res == 0 {
            let mut info_log = [0u8; INFO_LOG_LEN];
            let mut info_len = 0;
            gl::GetProgramInfoLog(
                id,
                INFO_LOG_LEN as i32,
                &mut info_len,
                info_log.as_mut_ptr() as _,
            );
            let log = info_log_to_string(&info_log, info_len);
            let e = BuildError::Link { log };
            error!("{e}");
            Some(e)
        } else {
            None
        };

        gl::DeleteShader(vertex.id);
        gl::DeleteShader(fragment.id);

        let status = match stage_failure.or(link_failure) {
            Some(e) => BuildStatus::Failed(e),
            None => BuildStatus::Ready,
        };

        ShaderProgram { id, status }
    }
}

fn info_log_to_string(buf: &[u8], len: i32) -> String {
    let len = (len.max(0) as usize).min(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

impl ShaderProgram {
    /// Builds a program from a vertex and a fragment source file. Never
    /// fails: a handle comes back even when reading, compiling or linking
    /// went wrong, with the diagnostics already logged.
    pub fn from_file(vs_path: &str, fs_path: &str) -> ShaderProgram {
        let (vs_src, vs_read_err) = read_source(vs_path);
        let (fs_src, fs_read_err) = read_source(fs_path);

        let vs = compile_stage(&vs_src, StageKind::Vertex);
        let fs = compile_stage(&fs_src, StageKind::Fragment);
        let mut program = link_program(vs, fs);

        // A read failure is the first failure on the build path; it takes
        // precedence over the compile failure its empty source causes
        // downstream. The pipeline still ran to completion above.
        if let Some(e) = vs_read_err.or(fs_read_err) {
            program.status = BuildStatus::Failed(e);
        }

        program
    }

    /// Like [`from_file`](Self::from_file), but surfaces the first build
    /// failure to the caller. The unusable program handle is released before
    /// returning the error.
    #[allow(unused)]
    pub fn try_from_file(vs_path: &str, fs_path: &str) -> Result<ShaderProgram, BuildError> {
        let program = Self::from_file(vs_path, fs_path);
        match program.status {
            BuildStatus::Ready => Ok(program),
            BuildStatus::Failed(ref e) => {
                let e = e.clone();
                program.delete();
                Err(e)
            }
        }
    }

    pub fn status(&self) -> &BuildStatus {
        &self.status
    }

    /// Makes this program current for subsequent draw calls.
    pub fn use_program(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
    }

    /// Releases the driver-side program. Consumes the handle, so the release
    /// happens at most once; the driver treats stale ids on its own terms.
    pub fn delete(self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }

    // A name absent from the linked program (e.g. optimized away by the
    // compiler) yields the -1 sentinel, which turns the following set call
    // into a driver-level no-op. That silence is part of the contract.
    fn uniform_location(&self, name: &str) -> i32 {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(self.id, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    #[allow(unused)]
    pub fn set_bool(&self, v: bool, name: &str) {
        unsafe {
            gl::Uniform1i(self.uniform_location(name), v as i32);
        }
    }

    #[allow(unused)]
    pub fn set_i32(&self, v: i32, name: &str) {
        unsafe {
            gl::Uniform1i(self.uniform_location(name), v);
        }
    }

    pub fn set_f32(&self, v: f32, name: &str) {
        unsafe {
            gl::Uniform1f(self.uniform_location(name), v);
        }
    }

    #[allow(unused)]
    pub fn set_vec3(&self, vec: Vec3, name: &str) {
        unsafe {
            gl::Uniform3f(self.uniform_location(name), vec.x, vec.y, vec.z);
        }
    }

    #[allow(unused)]
    pub fn set_mat4(&self, mat: Mat4, name: &str) {
        unsafe {
            gl::UniformMatrix4fv(
                self.uniform_location(name),
                1,
                gl::FALSE,
                mat.to_cols_array().as_ptr() as _,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_source_returns_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "#version 330 core\nvoid main() {{}}\n").unwrap();

        let src = load_source(file.path().to_str().unwrap());
        assert_eq!(src, "#version 330 core\nvoid main() {}\n");
    }

    #[test]
    fn load_source_is_empty_on_missing_file() {
        let src = load_source("does/not/exist.vert");
        assert!(src.is_empty());
    }

    #[test]
    fn read_failure_is_captured_alongside_the_empty_source() {
        let (src, err) = read_source("does/not/exist.vert");
        assert!(src.is_empty());
        assert_eq!(
            err,
            Some(BuildError::FileRead {
                path: "does/not/exist.vert".to_owned()
            })
        );
    }

    #[test]
    fn file_read_diagnostic_names_the_path() {
        let e = BuildError::FileRead {
            path: "shaders/missing.frag".to_owned(),
        };
        assert_eq!(
            e.to_string(),
            "ERROR::SHADER::FILE_NOT_SUCCESSFULLY_READ:shaders/missing.frag"
        );
    }

    #[test]
    fn compile_diagnostic_is_tagged_with_the_stage() {
        let vs = BuildError::Compile {
            stage: StageKind::Vertex,
            log: "0:1(1): error: syntax error".to_owned(),
        };
        let fs = BuildError::Compile {
            stage: StageKind::Fragment,
            log: "0:1(1): error: syntax error".to_owned(),
        };
        assert_eq!(
            vs.to_string(),
            "ERROR::SHADER::VERTEX::COMPILATION_FAILED\n0:1(1): error: syntax error"
        );
        assert_eq!(
            fs.to_string(),
            "ERROR::SHADER::FRAGMENT::COMPILATION_FAILED\n0:1(1): error: syntax error"
        );
    }

    #[test]
    fn link_diagnostic_is_tagged_as_program() {
        let e = BuildError::Link {
            log: "error: unresolved symbol".to_owned(),
        };
        assert_eq!(
            e.to_string(),
            "ERROR::SHADER::PROGRAM::LINKING_FAILED\nerror: unresolved symbol"
        );
    }

    #[test]
    fn status_classification() {
        assert!(BuildStatus::Ready.is_ready());
        assert!(!BuildStatus::Failed(BuildError::Link { log: String::new() }).is_ready());
    }

    #[test]
    fn info_log_is_bounded_and_trimmed() {
        let mut buf = [0u8; INFO_LOG_LEN];
        buf[..5].copy_from_slice(b"oops\n");

        assert_eq!(info_log_to_string(&buf, 5), "oops\n");
        assert_eq!(info_log_to_string(&buf, -1), "");
        // The driver cannot report more than the buffer we handed it.
        assert_eq!(info_log_to_string(&buf, 4096).len(), INFO_LOG_LEN);
    }

    #[test]
    fn stage_kind_maps_to_gl_enums() {
        assert_eq!(StageKind::Vertex.gl_enum(), gl::VERTEX_SHADER);
        assert_eq!(StageKind::Fragment.gl_enum(), gl::FRAGMENT_SHADER);
    }

    // The tests below need a live GL context and a driver, so they only run
    // with `cargo test -- --ignored` on a machine with a display.

    const VALID_VS: &str = "#version 330 core\nlayout (location = 0) in vec3 aPos;\nvoid main() { gl_Position = vec4(aPos, 1.0); }\n";
    const VALID_FS: &str = "#version 330 core\nout vec4 FragColor;\nvoid main() { FragColor = vec4(1.0); }\n";
    const BROKEN_VS: &str = "#version 330 core\nvoid main() { this is not glsl }\n";

    fn with_gl_context(f: impl FnOnce()) {
        let sdl = sdl2::init().unwrap();
        let video = sdl.video().unwrap();
        let gl_attr = video.gl_attr();
        gl_attr.set_context_version(3, 3);
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);

        let window = video
            .window("shader tests", 64, 64)
            .opengl()
            .hidden()
            .build()
            .unwrap();
        let _ctx = window.gl_create_context().unwrap();
        gl::load_with(|s| video.gl_get_proc_address(s) as *const _);

        f();
    }

    #[test]
    #[ignore]
    fn valid_sources_build_a_ready_program() {
        with_gl_context(|| {
            let vs = compile_stage(VALID_VS, StageKind::Vertex);
            let fs = compile_stage(VALID_FS, StageKind::Fragment);
            assert!(vs.succeeded());
            assert!(fs.succeeded());

            let program = link_program(vs, fs);
            assert!(program.status().is_ready());
            program.delete();
        });
    }

    #[test]
    #[ignore]
    fn broken_vertex_stage_still_yields_handles() {
        with_gl_context(|| {
            let vs = compile_stage(BROKEN_VS, StageKind::Vertex);
            let fs = compile_stage(VALID_FS, StageKind::Fragment);
            assert!(!vs.succeeded());
            assert!(fs.succeeded());

            // Linking is attempted regardless and the handle still comes back.
            let program = link_program(vs, fs);
            match program.status() {
                BuildStatus::Failed(BuildError::Compile { stage, log }) => {
                    assert_eq!(*stage, StageKind::Vertex);
                    assert!(!log.is_empty());
                }
                other => panic!("expected a vertex compile failure, got {other:?}"),
            }
            program.delete();
        });
    }

    #[test]
    #[ignore]
    fn sequential_builds_yield_distinct_programs() {
        with_gl_context(|| {
            let a = link_program(
                compile_stage(VALID_VS, StageKind::Vertex),
                compile_stage(VALID_FS, StageKind::Fragment),
            );
            let b = link_program(
                compile_stage(VALID_VS, StageKind::Vertex),
                compile_stage(VALID_FS, StageKind::Fragment),
            );
            assert_ne!(a.id, b.id);
            a.delete();
            b.delete();
        });
    }

    #[test]
    #[ignore]
    fn setting_an_unknown_uniform_is_a_no_op() {
        with_gl_context(|| {
            let program = link_program(
                compile_stage(VALID_VS, StageKind::Vertex),
                compile_stage(VALID_FS, StageKind::Fragment),
            );
            program.use_program();
            program.set_f32(1.0, "definitelyNotAUniform");
            program.set_bool(true, "alsoMissing");
            program.set_i32(7, "stillMissing");
            program.set_vec3(Vec3::ONE, "missingVec");
            program.set_mat4(Mat4::IDENTITY, "missingMat");

            unsafe {
                assert_eq!(gl::GetError(), gl::NO_ERROR);
            }
            program.delete();
        });
    }

    #[test]
    #[ignore]
    fn missing_source_file_surfaces_as_a_read_failure() {
        with_gl_context(|| {
            let mut fs_file = tempfile::NamedTempFile::new().unwrap();
            write!(fs_file, "{VALID_FS}").unwrap();

            let err = ShaderProgram::try_from_file(
                "does/not/exist.vert",
                fs_file.path().to_str().unwrap(),
            )
            .unwrap_err();

            // Not the compile failure the empty source causes downstream.
            assert_eq!(
                err,
                BuildError::FileRead {
                    path: "does/not/exist.vert".to_owned()
                }
            );
        });
    }
}
