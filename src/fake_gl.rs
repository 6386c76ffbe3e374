//! In-memory `GlDevice` used by the unit tests.
//!
//! It understands just enough GLSL to fail a compile on broken sources and a
//! link on mismatched stage interfaces, and it keeps the object/binding state
//! a real driver would so tests can read it back.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::device::GlDevice;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mode: u32,
    pub first: i32,
    pub count: i32,
    pub program: Option<u32>,
    pub vertex_array: Option<u32>,
}

#[derive(Debug)]
struct FakeShader {
    stage: u32,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
}

#[derive(Debug, Default, Clone, Copy)]
struct Attribute {
    size: i32,
    stride: i32,
    enabled: bool,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, FakeShader>,
    programs: HashMap<u32, FakeProgram>,
    buffers: HashMap<u32, usize>,
    vertex_arrays: HashMap<u32, HashMap<u32, Attribute>>,
    bound_buffers: HashMap<u32, u32>,
    bound_vertex_array: Option<u32>,
    current_program: Option<u32>,
    clear_color: [f32; 4],
    clears: Vec<[f32; 4]>,
    viewport: (i32, i32, i32, i32),
    draws: Vec<DrawCall>,
    errors: Vec<String>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

#[derive(Debug, Default)]
pub struct FakeGl {
    state: RefCell<State>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn is_shader_live(&self, shader: u32) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    pub fn is_program_live(&self, program: u32) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn attribute_stride(&self, vertex_array: u32, index: u32) -> Option<i32> {
        self.state
            .borrow()
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|attributes| attributes.get(&index))
            .map(|attribute| attribute.stride)
    }

    pub fn bound_vertex_array(&self) -> Option<u32> {
        self.state.borrow().bound_vertex_array
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn clears(&self) -> Vec<[f32; 4]> {
        self.state.borrow().clears.clone()
    }

    pub fn viewport_rect(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().viewport
    }

    /// Misuse a real driver would report through `glGetError`.
    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

fn check_source(source: &str) -> Result<(), String> {
    let mut depth = 0i32;
    for (line_number, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}: syntax error: unexpected '}}'", line_number + 1));
            }
        }
    }
    if depth != 0 {
        return Err("0:0: syntax error: unexpected end of file".to_string());
    }
    if !source.contains("void main(") {
        return Err("0:0: error: missing entry point 'main'".to_string());
    }
    Ok(())
}

/// Names declared with the given storage qualifier (`in` or `out`).
fn interface(source: &str, qualifier: &str) -> HashSet<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut line = line.trim();
            if line.starts_with("layout") {
                line = line.split_once(')')?.1.trim();
            }
            let mut tokens = line.split_whitespace();
            if tokens.next()? != qualifier {
                return None;
            }
            tokens
                .last()
                .map(|name| name.trim_end_matches(';').to_string())
        })
        .collect()
}

impl GlDevice for FakeGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;

    fn version_string(&self) -> String {
        "3.3.0 FakeGl".to_string()
    }

    fn create_shader(&self, stage: u32) -> Result<u32, String> {
        if stage != glow::VERTEX_SHADER && stage != glow::FRAGMENT_SHADER {
            return Err(format!("unsupported shader type {:#x}", stage));
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(s) => s.source = source.to_string(),
            None => state.error(format!("shader_source on unknown shader {}", shader)),
        }
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(s) => match check_source(&s.source) {
                Ok(()) => {
                    s.compiled = true;
                    s.log.clear();
                }
                Err(log) => {
                    s.compiled = false;
                    s.log = log;
                }
            },
            None => state.error(format!("compile_shader on unknown shader {}", shader)),
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_none() {
            state.error(format!("delete_shader on unknown shader {}", shader));
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.programs.insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.error(format!("attach_shader with unknown shader {}", shader));
            return;
        }
        match state.programs.get_mut(&program) {
            Some(p) => p.attached.push(shader),
            None => state.error(format!("attach_shader on unknown program {}", program)),
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let detached = match state.programs.get_mut(&program) {
            Some(p) => {
                let before = p.attached.len();
                p.attached.retain(|&attached| attached != shader);
                before != p.attached.len()
            }
            None => false,
        };
        if !detached {
            state.error(format!("detach_shader {} from program {}", shader, program));
        }
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            state.error(format!("link_program on unknown program {}", program));
            return;
        };

        let stage_source = |stage: u32| {
            attached
                .iter()
                .filter_map(|id| state.shaders.get(id))
                .find(|s| s.stage == stage && s.compiled)
                .map(|s| s.source.clone())
        };

        let result = match (
            stage_source(glow::VERTEX_SHADER),
            stage_source(glow::FRAGMENT_SHADER),
        ) {
            (Some(vertex), Some(fragment)) => {
                let outputs = interface(&vertex, "out");
                let mut missing: Vec<_> = interface(&fragment, "in")
                    .into_iter()
                    .filter(|name| !outputs.contains(name))
                    .collect();
                missing.sort();
                match missing.first() {
                    Some(name) => Err(format!(
                        "error: fragment shader input '{}' is not written by the vertex shader",
                        name
                    )),
                    None => Ok(()),
                }
            }
            _ => Err("error: program needs a compiled vertex and fragment shader".to_string()),
        };

        if let Some(p) = state.programs.get_mut(&program) {
            match result {
                Ok(()) => {
                    p.linked = true;
                    p.log.clear();
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = program {
            if !state.programs.get(&id).is_some_and(|p| p.linked) {
                state.error(format!("use_program on unlinked program {}", id));
                return;
            }
        }
        state.current_program = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_none() {
            state.error(format!("delete_program on unknown program {}", program));
        }
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.buffers.insert(id, 0);
        Ok(id)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        match buffer {
            Some(id) if !state.buffers.contains_key(&id) => {
                state.error(format!("bind_buffer with unknown buffer {}", id))
            }
            Some(id) => {
                state.bound_buffers.insert(target, id);
            }
            None => {
                state.bound_buffers.remove(&target);
            }
        }
    }

    fn buffer_data(&self, target: u32, data: &[u8], _usage: u32) {
        let mut state = self.state.borrow_mut();
        match state.bound_buffers.get(&target).copied() {
            Some(id) => {
                state.buffers.insert(id, data.len());
            }
            None => state.error(format!("buffer_data with nothing bound to {:#x}", target)),
        }
    }

    fn buffer_size(&self, target: u32) -> i32 {
        let state = self.state.borrow();
        state
            .bound_buffers
            .get(&target)
            .and_then(|id| state.buffers.get(id))
            .map_or(0, |&size| size as i32)
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&buffer).is_none() {
            state.error(format!("delete_buffer on unknown buffer {}", buffer));
        }
        state.bound_buffers.retain(|_, bound| *bound != buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.vertex_arrays.insert(id, HashMap::new());
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = vertex_array {
            if !state.vertex_arrays.contains_key(&id) {
                state.error(format!("bind_vertex_array with unknown array {}", id));
                return;
            }
        }
        state.bound_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        if state.vertex_arrays.remove(&vertex_array).is_none() {
            state.error(format!("delete_vertex_array on unknown array {}", vertex_array));
        }
        if state.bound_vertex_array == Some(vertex_array) {
            state.bound_vertex_array = None;
        }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        _offset: i32,
    ) {
        let mut state = self.state.borrow_mut();
        if !state.bound_buffers.contains_key(&glow::ARRAY_BUFFER) {
            state.error("vertex_attrib_pointer_f32 with no array buffer bound");
            return;
        }
        let Some(vao) = state.bound_vertex_array else {
            state.error("vertex_attrib_pointer_f32 with no vertex array bound");
            return;
        };
        if let Some(attributes) = state.vertex_arrays.get_mut(&vao) {
            let attribute = attributes.entry(index).or_default();
            attribute.size = size;
            attribute.stride = stride;
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        let Some(vao) = state.bound_vertex_array else {
            state.error("enable_vertex_attrib_array with no vertex array bound");
            return;
        };
        if let Some(attributes) = state.vertex_arrays.get_mut(&vao) {
            attributes.entry(index).or_default().enabled = true;
        }
    }

    fn vertex_attrib_parameter(&self, index: u32, parameter: u32) -> f32 {
        let state = self.state.borrow();
        let attribute = state
            .bound_vertex_array
            .and_then(|vao| state.vertex_arrays.get(&vao))
            .and_then(|attributes| attributes.get(&index))
            .copied()
            .unwrap_or_default();
        match parameter {
            glow::VERTEX_ATTRIB_ARRAY_ENABLED => attribute.enabled as i32 as f32,
            // GL reports 4 for an attribute that was never configured.
            glow::VERTEX_ATTRIB_ARRAY_SIZE if attribute.size == 0 => 4.0,
            glow::VERTEX_ATTRIB_ARRAY_SIZE => attribute.size as f32,
            glow::VERTEX_ATTRIB_ARRAY_STRIDE => attribute.stride as f32,
            _ => 0.0,
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = (x, y, width, height);
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state.borrow_mut().clear_color = [red, green, blue, alpha];
    }

    fn clear(&self, _mask: u32) {
        let mut state = self.state.borrow_mut();
        let color = state.clear_color;
        state.clears.push(color);
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        if state.current_program.is_none() {
            state.error("draw_arrays with no program in use");
        }
        if state.bound_vertex_array.is_none() {
            state.error("draw_arrays with no vertex array bound");
        }
        let draw = DrawCall {
            mode,
            first,
            count,
            program: state.current_program,
            vertex_array: state.bound_vertex_array,
        };
        state.draws.push(draw);
    }
}
