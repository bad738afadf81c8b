//! Backend that records everything it is asked to do.

use std::collections::{BTreeSet, HashMap};

use halo_shared::{Color, MaterialHandle, MeshData, MeshId, TextureHandle};

use crate::ral::{CommandBuffer, ParamValue, RenderBackend, RenderCommand, ShaderProgram};

/// In-memory [`RenderBackend`] for tests and benchmarks.
///
/// Materials remember the program they were forked from so submitted draws
/// can be classified by program after the fact.
#[derive(Debug)]
pub struct RecordingBackend {
    /// Programs that can be forked
    pub available: BTreeSet<ShaderProgram>,
    /// Program of every material ever created
    pub programs: HashMap<MaterialHandle, ShaderProgram>,
    /// Materials not destroyed yet
    pub live: BTreeSet<MaterialHandle>,
    /// Immediate parameter values
    pub params: HashMap<(MaterialHandle, &'static str), ParamValue>,
    /// Enabled keywords per material
    pub keywords: HashMap<MaterialHandle, BTreeSet<&'static str>>,
    /// Meshes currently uploaded
    pub meshes: HashMap<MeshId, MeshData>,
    /// Every upload, in order
    pub uploads: Vec<MeshId>,
    /// Every release, in order
    pub releases: Vec<MeshId>,
    /// Ramp texture contents
    pub textures: HashMap<TextureHandle, Vec<Color>>,
    /// Ramp creations plus ramp updates
    pub ramp_writes: usize,
    /// Every submitted buffer, in order
    pub submitted: Vec<CommandBuffer>,
    next_handle: u64,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Backend with every program available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: ShaderProgram::ALL.into_iter().collect(),
            programs: HashMap::new(),
            live: BTreeSet::new(),
            params: HashMap::new(),
            keywords: HashMap::new(),
            meshes: HashMap::new(),
            uploads: Vec::new(),
            releases: Vec::new(),
            textures: HashMap::new(),
            ramp_writes: 0,
            submitted: Vec::new(),
            next_handle: 0,
        }
    }

    /// Makes `program` unavailable for future forks.
    pub fn remove_program(&mut self, program: ShaderProgram) {
        self.available.remove(&program);
    }

    /// Makes `program` available again.
    pub fn restore_program(&mut self, program: ShaderProgram) {
        self.available.insert(program);
    }

    /// Number of materials alive
    #[must_use]
    pub fn live_materials(&self) -> usize {
        self.live.len()
    }

    /// Number of live materials forked from `program`
    #[must_use]
    pub fn live_materials_of(&self, program: ShaderProgram) -> usize {
        self.live.iter().filter(|m| self.programs.get(m) == Some(&program)).count()
    }

    /// Program a material was forked from.
    #[must_use]
    pub fn program_of(&self, material: MaterialHandle) -> Option<ShaderProgram> {
        self.programs.get(&material).copied()
    }

    /// Immediate value of a parameter.
    #[must_use]
    pub fn param(&self, material: MaterialHandle, name: &'static str) -> Option<ParamValue> {
        self.params.get(&(material, name)).copied()
    }

    /// True when the keyword is enabled on the material.
    #[must_use]
    pub fn has_keyword(&self, material: MaterialHandle, keyword: &str) -> bool {
        self.keywords.get(&material).is_some_and(|k| k.contains(keyword))
    }

    /// Every mesh upload, in order
    #[must_use]
    pub fn uploaded_meshes(&self) -> &[MeshId] {
        &self.uploads
    }

    /// Every mesh release, in order
    #[must_use]
    pub fn released_meshes(&self) -> &[MeshId] {
        &self.releases
    }

    /// Ramp creations plus updates
    #[must_use]
    pub const fn ramp_uploads(&self) -> usize {
        self.ramp_writes
    }

    /// Commands of every submitted buffer, flattened.
    pub fn commands(&self) -> impl Iterator<Item = &RenderCommand> {
        self.submitted.iter().flat_map(CommandBuffer::commands)
    }

    /// Forgets submitted buffers.
    pub fn clear_submissions(&mut self) {
        self.submitted.clear();
    }

    /// Draw commands using a material forked from `program`.
    #[must_use]
    pub fn draws_with(&self, program: ShaderProgram) -> usize {
        self.draw_programs().into_iter().filter(|p| *p == program).count()
    }

    /// Draws weighted by instance count: an instanced draw counts once per instance.
    #[must_use]
    pub fn instance_draws_with(&self, program: ShaderProgram) -> usize {
        self.commands()
            .filter(|c| c.is_draw() && c.material().and_then(|m| self.program_of(m)) == Some(program))
            .map(|c| match c {
                RenderCommand::DrawMeshInstanced { instances, .. } => instances.len(),
                _ => 1,
            })
            .sum()
    }

    /// Instanced draw commands using `program`.
    #[must_use]
    pub fn instanced_draws_with(&self, program: ShaderProgram) -> usize {
        self.commands()
            .filter(|c| matches!(c, RenderCommand::DrawMeshInstanced { .. }))
            .filter(|c| c.material().and_then(|m| self.program_of(m)) == Some(program))
            .count()
    }

    /// Program of every draw, in submission order.
    #[must_use]
    pub fn draw_programs(&self) -> Vec<ShaderProgram> {
        self.commands().filter(|c| c.is_draw()).filter_map(|c| c.material().and_then(|m| self.program_of(m))).collect()
    }

    /// Temporary targets acquired
    #[must_use]
    pub fn acquired_targets(&self) -> usize {
        self.commands().filter(|c| matches!(c, RenderCommand::AcquireTemporary { .. })).count()
    }

    /// Temporary targets released
    #[must_use]
    pub fn released_targets(&self) -> usize {
        self.commands().filter(|c| matches!(c, RenderCommand::ReleaseTemporary { .. })).count()
    }

    /// Last value recorded in a command stream for a material parameter.
    #[must_use]
    pub fn recorded_param(&self, material: MaterialHandle, name: &str) -> Option<ParamValue> {
        self.commands()
            .filter_map(|c| match c {
                RenderCommand::SetParam { material: m, name: n, value } if *m == material && *n == name => Some(*value),
                _ => None,
            })
            .last()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_material(&mut self, program: ShaderProgram) -> Option<MaterialHandle> {
        if !self.available.contains(&program) {
            return None;
        }
        self.next_handle += 1;
        let handle = MaterialHandle(self.next_handle);
        self.programs.insert(handle, program);
        self.live.insert(handle);
        Some(handle)
    }

    fn destroy_material(&mut self, material: MaterialHandle) {
        self.live.remove(&material);
        self.keywords.remove(&material);
        self.params.retain(|(m, _), _| *m != material);
    }

    fn set_param(&mut self, material: MaterialHandle, name: &'static str, value: ParamValue) {
        self.params.insert((material, name), value);
    }

    fn set_keyword(&mut self, material: MaterialHandle, keyword: &'static str, enabled: bool) {
        let set = self.keywords.entry(material).or_default();
        if enabled {
            set.insert(keyword);
        } else {
            set.remove(keyword);
        }
    }

    fn upload_mesh(&mut self, mesh: &MeshData) {
        self.uploads.push(mesh.id);
        self.meshes.insert(mesh.id, mesh.clone());
    }

    fn release_mesh(&mut self, mesh: MeshId) {
        self.releases.push(mesh);
        self.meshes.remove(&mesh);
    }

    fn create_ramp_texture(&mut self, pixels: &[Color]) -> TextureHandle {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.textures.insert(handle, pixels.to_vec());
        self.ramp_writes += 1;
        handle
    }

    fn update_ramp_texture(&mut self, texture: TextureHandle, pixels: &[Color]) {
        self.textures.insert(texture, pixels.to_vec());
        self.ramp_writes += 1;
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn submit(&mut self, commands: &CommandBuffer) {
        self.submitted.push(commands.clone());
    }
}
