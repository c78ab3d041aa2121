use std::collections::HashMap;

use anyhow::{anyhow, Result};
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::assets::{AssetManager, Handle};
use crate::config::Resolution;
use crate::game::Frame;
use crate::mesh::{Mesh, Vertex};

use super::shared::{CLEAR_COLOR, FRAGMENT_SHADER, VERTEX_SHADER};

/// Renderer backed by a WebGL2 canvas context.
pub struct Renderer {
    canvas: HtmlCanvasElement,
    gl: Gl,
    program: WebGlProgram,
    uniforms: Uniforms,
    meshes: HashMap<Handle<Mesh>, GpuMesh>,
    size: Resolution,
}

struct Uniforms {
    view_proj: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    light_color: Option<WebGlUniformLocation>,
}

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    vertex_buffer: WebGlBuffer,
    index_buffer: WebGlBuffer,
    index_count: i32,
    generation: u64,
}

impl Renderer {
    /// Creates a renderer drawing into `canvas`, sized to `size`.
    pub fn new(canvas: HtmlCanvasElement, size: Resolution) -> Result<Self> {
        let gl = canvas
            .get_context("webgl2")
            .map_err(|err| anyhow!("failed to query canvas context: {err:?}"))?
            .ok_or_else(|| anyhow!("canvas does not support webgl2"))?
            .dyn_into::<Gl>()
            .map_err(|_| anyhow!("failed to cast canvas context"))?;

        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;
        let uniforms = Uniforms {
            view_proj: gl.get_uniform_location(&program, "u_view_proj"),
            model: gl.get_uniform_location(&program, "u_model"),
            light_dir: gl.get_uniform_location(&program, "u_light_dir"),
            light_color: gl.get_uniform_location(&program, "u_light_color"),
        };

        gl.enable(Gl::DEPTH_TEST);
        gl.depth_func(Gl::LESS);

        let mut renderer = Self {
            canvas,
            gl,
            program,
            uniforms,
            meshes: HashMap::new(),
            size: Resolution::new(0, 0),
        };
        renderer.resize(size);
        Ok(renderer)
    }

    /// Resizes the canvas backing store and viewport. Empty sizes are ignored.
    pub fn resize(&mut self, size: Resolution) {
        if size.is_empty() || size == self.size {
            return;
        }
        self.size = size;
        self.canvas.set_width(size.x);
        self.canvas.set_height(size.y);
        self.gl.viewport(0, 0, size.x as i32, size.y as i32);
    }

    /// Draws `frame`, uploading any mesh that is new or changed since the
    /// previous frame.
    pub fn render(&mut self, frame: &Frame, assets: &AssetManager<Mesh>) -> Result<()> {
        self.resize(frame.resolution);
        self.evict_stale(assets);

        let [r, g, b, a] = CLEAR_COLOR;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);

        self.gl.use_program(Some(&self.program));
        self.gl.uniform_matrix4fv_with_f32_array(
            self.uniforms.view_proj.as_ref(),
            false,
            &frame.camera.view_proj.to_cols_array(),
        );
        self.gl.uniform3fv_with_f32_array(
            self.uniforms.light_dir.as_ref(),
            &frame.light.to_light().to_array(),
        );
        let color = frame.light.color.extend(frame.light.intensity);
        self.gl
            .uniform4fv_with_f32_array(self.uniforms.light_color.as_ref(), &color.to_array());

        for item in &frame.items {
            let (Some(mesh), Some(generation)) =
                (assets.get(item.mesh), assets.generation(item.mesh))
            else {
                continue;
            };
            self.sync_mesh(item.mesh, mesh, generation)?;
            let Some(gpu) = self.meshes.get(&item.mesh) else {
                continue;
            };
            self.gl.uniform_matrix4fv_with_f32_array(
                self.uniforms.model.as_ref(),
                false,
                &item.model.to_cols_array(),
            );
            self.gl.bind_vertex_array(Some(&gpu.vao));
            self.gl
                .draw_elements_with_i32(Gl::TRIANGLES, gpu.index_count, Gl::UNSIGNED_INT, 0);
        }
        self.gl.bind_vertex_array(None);
        Ok(())
    }

    fn sync_mesh(&mut self, handle: Handle<Mesh>, mesh: &Mesh, generation: u64) -> Result<()> {
        if let Some(gpu) = self.meshes.get_mut(&handle) {
            if gpu.generation != generation {
                write_buffers(&self.gl, gpu, mesh);
                gpu.index_count = mesh.indices.len() as i32;
                gpu.generation = generation;
            }
            return Ok(());
        }
        let gpu = self.upload(mesh, generation)?;
        debug!("uploaded mesh {handle:?} ({} triangles)", mesh.triangle_count());
        self.meshes.insert(handle, gpu);
        Ok(())
    }

    fn upload(&self, mesh: &Mesh, generation: u64) -> Result<GpuMesh> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| anyhow!("failed to create vertex array"))?;
        let vertex_buffer = gl
            .create_buffer()
            .ok_or_else(|| anyhow!("failed to create vertex buffer"))?;
        let index_buffer = gl
            .create_buffer()
            .ok_or_else(|| anyhow!("failed to create index buffer"))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&vertex_buffer));
        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        let stride = Vertex::STRIDE as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(
            1,
            3,
            Gl::FLOAT,
            false,
            stride,
            Vertex::NORMAL_OFFSET as i32,
        );

        let gpu = GpuMesh {
            vao,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as i32,
            generation,
        };
        write_buffers(gl, &gpu, mesh);
        gl.bind_vertex_array(None);
        Ok(gpu)
    }

    fn evict_stale(&mut self, assets: &AssetManager<Mesh>) {
        let gl = &self.gl;
        self.meshes.retain(|handle, gpu| {
            let alive = assets.contains(*handle);
            if !alive {
                gl.delete_vertex_array(Some(&gpu.vao));
                gl.delete_buffer(Some(&gpu.vertex_buffer));
                gl.delete_buffer(Some(&gpu.index_buffer));
            }
            alive
        });
    }
}

fn write_buffers(gl: &Gl, gpu: &GpuMesh, mesh: &Mesh) {
    gl.bind_vertex_array(Some(&gpu.vao));
    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&gpu.vertex_buffer));
    gl.buffer_data_with_u8_array(
        Gl::ARRAY_BUFFER,
        bytemuck::cast_slice(&mesh.vertices),
        Gl::DYNAMIC_DRAW,
    );
    gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&gpu.index_buffer));
    gl.buffer_data_with_u8_array(
        Gl::ELEMENT_ARRAY_BUFFER,
        bytemuck::cast_slice(&mesh.indices),
        Gl::DYNAMIC_DRAW,
    );
    gl.bind_vertex_array(None);
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| anyhow!("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(anyhow!("shader compilation failed: {log}"))
    }
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram> {
    let program = gl
        .create_program()
        .ok_or_else(|| anyhow!("failed to create shader program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);
    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(anyhow!("shader program link failed: {log}"))
    }
}
