use atelier_engine::coords::{Vec2, Viewport};
use atelier_engine::core::{App, AppControl, FrameCtx};
use atelier_engine::input::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};
use atelier_engine::paint::Color;
use atelier_engine::render::MeshRenderer;
use atelier_engine::scene::{MeshList, ZIndex};
use atelier_engine::window::CursorIcon;
use atelier_gallery::prelude::*;
use winit::window::WindowId;

use crate::layout::PageLayout;

/// Distance from the camera to the mesh plane, in world units.
const CAMERA_DISTANCE: f32 = 5.0;

/// Logical px per wheel "line".
const WHEEL_LINE_HEIGHT: f32 = 40.0;

/// Render-loop driver: owns the page, the gallery and the renderer.
pub struct StudioApp {
    // Kept alive for the gallery's pending decodes.
    _loader: TextureLoader,
    gallery: GalleryGroup,
    page: PageLayout,
    fov_y: f32,
    background: Color,

    ctx: ViewportContext,
    shown: bool,
    textured: usize,

    renderer: MeshRenderer,
    meshes: MeshList,
}

impl StudioApp {
    pub fn new(
        loader: TextureLoader,
        gallery: GalleryGroup,
        page: PageLayout,
        fov_y: f32,
        background: Color,
    ) -> Self {
        Self {
            _loader: loader,
            gallery,
            page,
            fov_y,
            background,
            ctx: ViewportContext::default(),
            shown: false,
            textured: 0,
            renderer: MeshRenderer::new(),
            meshes: MeshList::new(),
        }
    }

    /// Applies this frame's input to the gallery. Returns `Exit` on Escape.
    fn handle_input(&mut self, frame: &FrameCtx<'_, '_>) -> AppControl {
        for event in &frame.input_frame.events {
            match event {
                InputEvent::PointerButton(b) if b.button == MouseButton::Left => match b.state {
                    MouseButtonState::Pressed => {
                        self.gallery.on_input_start(Vec2::new(b.x, b.y));
                        frame.window.set_cursor(CursorIcon::Grabbing);
                    }
                    MouseButtonState::Released => {
                        self.gallery.on_input_end();
                        frame.window.set_cursor(CursorIcon::Grab);
                    }
                },

                InputEvent::PointerMoved(p) => {
                    self.gallery.on_input_move(Vec2::new(p.x, p.y));
                }

                InputEvent::PointerLeft | InputEvent::Focused(false) => {
                    if self.gallery.is_dragging() {
                        self.gallery.on_input_end();
                        frame.window.set_cursor(CursorIcon::Default);
                    }
                }

                InputEvent::MouseWheel { delta, .. } => {
                    let (x, y) = delta.to_pixels(WHEEL_LINE_HEIGHT);
                    self.gallery.on_wheel(Vec2::new(x, y));
                }

                InputEvent::Key {
                    key,
                    state: KeyState::Pressed,
                    repeat: false,
                    ..
                } => match key {
                    Key::Escape => return AppControl::Exit,
                    Key::H => self.toggle_visibility(),
                    Key::Home => self.gallery.jump_to(Vec2::ZERO),
                    Key::ArrowLeft => self.gallery.on_wheel(Vec2::new(self.ctx.viewport.width * 0.25, 0.0)),
                    Key::ArrowRight => self.gallery.on_wheel(Vec2::new(-self.ctx.viewport.width * 0.25, 0.0)),
                    Key::ArrowUp | Key::PageUp => {
                        self.gallery.on_wheel(Vec2::new(0.0, self.ctx.viewport.height * 0.5))
                    }
                    Key::ArrowDown | Key::PageDown => {
                        self.gallery.on_wheel(Vec2::new(0.0, -self.ctx.viewport.height * 0.5))
                    }
                    _ => {}
                },

                _ => {}
            }
        }
        AppControl::Continue
    }

    fn toggle_visibility(&mut self) {
        self.shown = !self.shown;
        if self.shown {
            self.gallery.show();
        } else {
            self.gallery.hide();
        }
        log::debug!("gallery {}", if self.shown { "shown" } else { "hidden" });
    }
}

impl App for StudioApp {
    fn on_resize(&mut self, _window_id: WindowId, viewport: Viewport) {
        self.page.relayout(viewport);
        self.ctx = ViewportContext::from_perspective(viewport, self.fov_y, CAMERA_DISTANCE);
        self.gallery.on_resize(self.ctx, &self.page);

        log::debug!(
            "resized to {}x{} px, scene {:.3}x{:.3}",
            viewport.width,
            viewport.height,
            self.ctx.sizes.width,
            self.ctx.sizes.height
        );

        // First layout: fade everything in.
        if !self.shown {
            self.toggle_visibility();
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(ctx) == AppControl::Exit {
            return AppControl::Exit;
        }

        // ── Gallery step ──────────────────────────────────────────────────
        if self.gallery.poll_textures() > 0 {
            self.textured = self.gallery.items().iter().filter(|m| m.texture().is_some()).count();
            ctx.runtime
                .set_title(format!("atelier studio ({}/{} loaded)", self.textured, self.gallery.len()));
        }
        self.gallery.animate(ctx.time.dt);
        self.gallery.update();

        self.meshes.clear();
        self.gallery.draw(&mut self.meshes, ZIndex(0));

        // ── Render ────────────────────────────────────────────────────────
        let renderer = &mut self.renderer;
        let meshes = &mut self.meshes;
        let sizes = self.ctx.sizes;

        ctx.render(self.background, |rctx, target| {
            renderer.render(rctx, target, meshes, sizes);
        })
    }
}
