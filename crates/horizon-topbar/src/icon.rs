//! The icon handle.
//!
//! An [`Icon`] is a cheap, cloneable handle: an [`IconId`] plus a reference to
//! the owning context. All state lives in the context's arena, so two
//! handles to the same icon always agree, and a handle to a destroyed icon
//! fails every operation with [`IconError::Destroyed`](crate::IconError::Destroyed).
//!
//! Mutators return `Result<&Self>` so calls can be chained:
//!
//! ```
//! use horizon_topbar::IconContext;
//!
//! let context = IconContext::new();
//! let icon = context.create_icon();
//! icon.set_name("shop")?
//!     .set_label("Shop", None)?
//!     .align_right()?
//!     .set_order(2)?;
//! assert_eq!(icon.order()?, 2);
//! # Ok::<(), horizon_topbar::IconError>(())
//! ```
//!
//! The behavior of an icon is spread over several modules, each adding its
//! own `impl Icon` block: the state machine, theming, grouping, notices,
//! bindings and events.

use std::fmt;
use std::sync::Arc;

use horizon_topbar_core::logging::targets;
use horizon_topbar_core::{CleanupId, IconState};
use horizon_topbar_style::resolve::ResolvedTheme;

use crate::context::{ContextInner, IconContext};
use crate::error::Result;
use crate::registry::{Alignment, IconId};

/// A handle to one icon.
#[derive(Clone)]
pub struct Icon {
    id: IconId,
    ctx: Arc<ContextInner>,
}

impl Icon {
    pub(crate) fn from_parts(id: IconId, ctx: Arc<ContextInner>) -> Self {
        Self { id, ctx }
    }

    /// The icon's id. Stable for the icon's whole life.
    #[inline]
    pub fn id(&self) -> IconId {
        self.id
    }

    pub(crate) fn context_inner(&self) -> &Arc<ContextInner> {
        &self.ctx
    }

    /// The context that owns this icon.
    pub fn context(&self) -> IconContext {
        IconContext::from_inner(self.ctx.clone())
    }

    /// Whether the icon has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.ctx.read(self.id, |_| ()).is_err()
    }

    /// Rename the icon. The name is a lookup key only; the id does not change.
    pub fn set_name(&self, name: &str) -> Result<&Self> {
        self.ctx.update(self.id, |data| {
            if data.name != name {
                tracing::trace!(target: targets::ICON, id = %self.id, old = %data.name, new = %name, "icon renamed");
                data.name = name.to_string();
            }
        })?;
        Ok(self)
    }

    pub fn name(&self) -> Result<String> {
        self.ctx.read(self.id, |data| data.name.clone())
    }

    /// The current selection state.
    pub fn state(&self) -> Result<IconState> {
        self.ctx.read(self.id, |data| data.state)
    }

    /// Selected or viewing.
    pub fn is_selected(&self) -> Result<bool> {
        self.ctx.read(self.id, |data| data.state.is_selected())
    }

    pub fn is_viewing(&self) -> Result<bool> {
        self.ctx.read(self.id, |data| data.state == IconState::Viewing)
    }

    /// Enable or disable the icon. A disabled icon ignores every request to
    /// select it and every input directed at it.
    pub fn set_enabled(&self, enabled: bool) -> Result<&Self> {
        self.ctx
            .update_appearance(self.id, |data| std::mem::replace(&mut data.enabled, enabled) != enabled)?;
        Ok(self)
    }

    pub fn is_enabled(&self) -> Result<bool> {
        self.ctx.read(self.id, |data| data.enabled)
    }

    pub fn set_alignment(&self, alignment: Alignment) -> Result<&Self> {
        self.ctx.update_appearance(self.id, |data| {
            std::mem::replace(&mut data.alignment, alignment) != alignment
        })?;
        Ok(self)
    }

    pub fn align_left(&self) -> Result<&Self> {
        self.set_alignment(Alignment::Left)
    }

    pub fn align_center(&self) -> Result<&Self> {
        self.set_alignment(Alignment::Center)
    }

    pub fn align_right(&self) -> Result<&Self> {
        self.set_alignment(Alignment::Right)
    }

    pub fn alignment(&self) -> Result<Alignment> {
        self.ctx.read(self.id, |data| data.alignment)
    }

    /// Set the sort order among icons with the same alignment. Lower
    /// orders are placed first.
    pub fn set_order(&self, order: i32) -> Result<&Self> {
        self.ctx
            .update_appearance(self.id, |data| std::mem::replace(&mut data.order, order) != order)?;
        Ok(self)
    }

    pub fn order(&self) -> Result<i32> {
        self.ctx.read(self.id, |data| data.order)
    }

    /// Opt this icon in or out of auto-deselect.
    ///
    /// While the icon is inside a dropdown or menu the setting is remembered
    /// and takes effect once it leaves.
    pub fn set_auto_deselect(&self, enabled: bool) -> Result<&Self> {
        self.ctx.update(self.id, |data| data.set_auto_deselect(enabled))?;
        Ok(self)
    }

    /// The auto-deselect setting in effect right now.
    pub fn auto_deselect(&self) -> Result<bool> {
        self.ctx.read(self.id, |data| data.auto_deselect)
    }

    /// When on, a successful select is immediately followed by a deselect,
    /// turning the icon into a plain button.
    pub fn set_one_click(&self, enabled: bool) -> Result<&Self> {
        self.ctx.update(self.id, |data| data.one_click = enabled)?;
        Ok(self)
    }

    pub fn one_click(&self) -> Result<bool> {
        self.ctx.read(self.id, |data| data.one_click)
    }

    /// Hand a resource to the icon's janitor. `cleanup` runs exactly once:
    /// when the icon is destroyed.
    pub fn add_cleanup<F>(&self, cleanup: F) -> Result<CleanupId>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ctx.update(self.id, |data| data.janitor.add(cleanup))
    }

    /// Everything a renderer needs to draw the icon, captured atomically.
    pub fn snapshot(&self) -> Result<IconSnapshot> {
        let registry = self.ctx.registry.lock();
        let data = registry.get(self.id)?;
        Ok(IconSnapshot {
            id: self.id,
            name: data.name.clone(),
            state: data.state,
            enabled: data.enabled,
            locked: data.is_locked(),
            alignment: data.alignment,
            order: data.order,
            notices: data.notices,
            displayed_notices: registry.displayed_notices(self.id),
            dropdown: data.dropdown.clone(),
            menu: data.menu.clone(),
            theme: crate::theming::resolve_all(&registry, data),
        })
    }

    /// Destroy the icon.
    ///
    /// The icon leaves the registry and its groups, its janitor runs, and its
    /// children are destroyed or detached according to the context's
    /// [`DestroyPolicy`](crate::DestroyPolicy). Destroying twice fails with
    /// [`IconError::Destroyed`](crate::IconError::Destroyed).
    pub fn destroy(&self) -> Result<()> {
        self.ctx.destroy(self.id)
    }
}

impl PartialEq for Icon {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.ctx, &other.ctx)
    }
}

impl Eq for Icon {}

impl fmt::Debug for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Icon");
        debug.field("id", &self.id);
        match self.ctx.read(self.id, |data| (data.name.clone(), data.state)) {
            Ok((name, state)) => debug.field("name", &name).field("state", &state),
            Err(_) => debug.field("destroyed", &true),
        };
        debug.finish()
    }
}

/// A point-in-time view of one icon, as a renderer consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSnapshot {
    pub id: IconId,
    pub name: String,
    pub state: IconState,
    pub enabled: bool,
    pub locked: bool,
    pub alignment: Alignment,
    pub order: i32,
    /// The icon's own notices.
    pub notices: u32,
    /// The badge count: own notices plus hidden children's.
    pub displayed_notices: u32,
    pub dropdown: Vec<IconId>,
    pub menu: Vec<IconId>,
    /// Every themed property resolved for the current state.
    pub theme: ResolvedTheme,
}

static_assertions::assert_impl_all!(Icon: Send, Sync);

impl From<&Icon> for IconId {
    fn from(icon: &Icon) -> Self {
        icon.id
    }
}

impl From<Icon> for IconId {
    fn from(icon: Icon) -> Self {
        icon.id
    }
}
