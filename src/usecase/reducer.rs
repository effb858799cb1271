//! Pure state transitions.
//!
//! `reduce` applies one action to a copy of the state and lists the
//! effects to run. It performs no I/O beyond logging, so every transition
//! can be tested without a runtime.

use super::state::{Action, Effect, State};
use crate::session::AuthorizationStatus;

/// Read-only facts a transition may depend on.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub authorization: AuthorizationStatus,
}

/// Applies `action` to `state`.
pub fn reduce(state: &State, action: Action, context: &Context) -> (State, Vec<Effect>) {
    let mut next = state.clone();
    let effects = handle(action, &mut next, context);
    (next, effects)
}

fn handle(action: Action, state: &mut State, context: &Context) -> Vec<Effect> {
    match action {
        Action::ViewDidLoad => match context.authorization {
            AuthorizationStatus::Authorized => {
                state.is_authorized = true;
                vec![]
            }
            AuthorizationStatus::NotDetermined => vec![Effect::RequestAccess],
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                state.is_authorized = false;
                vec![]
            }
        },

        Action::ViewWillAppear => {
            if state.is_authorized {
                vec![Effect::ConfigureAndStart]
            } else {
                vec![]
            }
        }

        Action::ConfigureRenderTarget(target) => vec![Effect::BindRenderTarget(target)],

        Action::RequestAccessResponse(granted) => {
            state.is_authorized = granted;
            if granted {
                tracing::info!("Camera access granted");
                vec![Effect::ConfigureAndStart]
            } else {
                tracing::warn!("Camera access not granted");
                vec![]
            }
        }

        Action::SessionConfigured(configuration) => {
            state.is_configured = true;
            state.dimensions = configuration.dimensions;
            vec![]
        }

        Action::SessionConfiguredWithError(error) => {
            state.is_configured = false;
            tracing::error!(error = %error, "Session configuration failed");
            vec![]
        }

        Action::TakePictureTapped => {
            state.is_taking_picture = true;
            vec![]
        }

        Action::PictureTaken(image) => {
            state.captured_image = Some(image);
            state.is_taking_picture = false;
            vec![]
        }

        Action::SwitchCameraTapped => {
            state.is_changing_camera = true;
            vec![Effect::ToggleCamera]
        }

        Action::ChangeCameraResponse(error) => {
            if let Some(error) = error {
                tracing::warn!(error = %error, "Camera switch failed");
            }
            state.is_changing_camera = false;
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{
        Device, DeviceInput, DeviceType, Dimensions, Frame, GraphConfiguration, GraphError,
        Position,
    };
    use crate::render::{RenderTarget, Surface};
    use std::sync::Arc;

    const AUTHORIZED: Context = Context {
        authorization: AuthorizationStatus::Authorized,
    };

    fn run(state: &State, action: Action) -> (State, Vec<Effect>) {
        reduce(state, action, &AUTHORIZED)
    }

    fn configuration() -> GraphConfiguration {
        let device = Device::new(
            "back",
            Position::Back,
            DeviceType::WideAngleCamera,
            Dimensions::new(1920, 1080),
        );
        GraphConfiguration {
            input: Some(DeviceInput::new(device)),
            dimensions: Some(Dimensions::new(1920, 1080)),
        }
    }

    struct NullSurface;

    impl Surface for NullSurface {
        fn drawable_size(&self) -> Dimensions {
            Dimensions::new(1, 1)
        }

        fn present(&self, _frame: &Frame, _scale: f64) {}
    }

    fn every_action() -> Vec<Action> {
        vec![
            Action::ViewDidLoad,
            Action::ViewWillAppear,
            Action::TakePictureTapped,
            Action::SwitchCameraTapped,
            Action::ConfigureRenderTarget(RenderTarget::new(Arc::new(NullSurface))),
            Action::RequestAccessResponse(true),
            Action::RequestAccessResponse(false),
            Action::SessionConfigured(configuration()),
            Action::SessionConfiguredWithError(GraphError::OutputUnavailable),
            Action::PictureTaken(Arc::new(Frame::filled(Dimensions::new(1, 1), [0, 0, 0], 1))),
            Action::ChangeCameraResponse(None),
            Action::ChangeCameraResponse(Some(GraphError::DeviceUnavailable)),
        ]
    }

    #[test]
    fn test_view_did_load_by_authorization() {
        let state = State::default();

        let (next, effects) = run(&state, Action::ViewDidLoad);
        assert!(next.is_authorized);
        assert!(effects.is_empty());

        let undetermined = Context {
            authorization: AuthorizationStatus::NotDetermined,
        };
        let (next, effects) = reduce(&state, Action::ViewDidLoad, &undetermined);
        assert!(!next.is_authorized);
        assert!(matches!(effects.as_slice(), [Effect::RequestAccess]));

        for status in [AuthorizationStatus::Denied, AuthorizationStatus::Restricted] {
            let authorized = State {
                is_authorized: true,
                ..Default::default()
            };
            let (next, effects) =
                reduce(&authorized, Action::ViewDidLoad, &Context { authorization: status });
            assert!(!next.is_authorized);
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn test_access_granted_configures() {
        let (next, effects) = run(&State::default(), Action::RequestAccessResponse(true));
        assert!(next.is_authorized);
        assert!(matches!(effects.as_slice(), [Effect::ConfigureAndStart]));

        let (next, effects) = run(&next, Action::RequestAccessResponse(false));
        assert!(!next.is_authorized);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_view_will_appear_requires_authorization() {
        let (_, effects) = run(&State::default(), Action::ViewWillAppear);
        assert!(effects.is_empty());

        let authorized = State {
            is_authorized: true,
            ..Default::default()
        };
        let (_, effects) = run(&authorized, Action::ViewWillAppear);
        assert!(matches!(effects.as_slice(), [Effect::ConfigureAndStart]));
    }

    #[test]
    fn test_session_configured_sets_dimensions() {
        let (next, _) = run(&State::default(), Action::SessionConfigured(configuration()));
        assert!(next.is_configured);
        assert_eq!(next.dimensions, Some(Dimensions::new(1920, 1080)));

        let (next, effects) = run(
            &next,
            Action::SessionConfiguredWithError(GraphError::DeviceUnavailable),
        );
        assert!(!next.is_configured);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_picture_cycle() {
        let (requested, _) = run(&State::default(), Action::TakePictureTapped);
        assert!(requested.is_taking_picture);

        let image = Arc::new(Frame::filled(Dimensions::new(1, 1), [9, 9, 9], 4));
        let (taken, effects) = run(&requested, Action::PictureTaken(Arc::clone(&image)));
        assert!(!taken.is_taking_picture);
        assert_eq!(taken.captured_image.unwrap().sequence(), 4);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_switch_camera_cycle() {
        let configured = State {
            is_configured: true,
            ..Default::default()
        };
        let (switching, effects) = run(&configured, Action::SwitchCameraTapped);
        assert!(switching.is_changing_camera);
        assert!(matches!(effects.as_slice(), [Effect::ToggleCamera]));

        let (done, _) = run(
            &switching,
            Action::ChangeCameraResponse(Some(GraphError::DeviceUnavailable)),
        );
        assert!(!done.is_changing_camera);
        assert!(done.is_configured);
    }

    #[test]
    fn test_render_target_is_an_effect_only() {
        let target = RenderTarget::new(Arc::new(NullSurface));
        let (next, effects) = run(&State::default(), Action::ConfigureRenderTarget(target));
        assert!(!next.is_configured);
        assert!(matches!(effects.as_slice(), [Effect::BindRenderTarget(_)]));
    }

    #[test]
    fn test_every_action_is_defined_on_every_flag_combination() {
        for bits in 0u8..16 {
            let state = State {
                is_authorized: bits & 1 != 0,
                is_configured: bits & 2 != 0,
                is_taking_picture: bits & 4 != 0,
                is_changing_camera: bits & 8 != 0,
                ..Default::default()
            };
            for status in [
                AuthorizationStatus::Authorized,
                AuthorizationStatus::Denied,
                AuthorizationStatus::Restricted,
                AuthorizationStatus::NotDetermined,
            ] {
                for action in every_action() {
                    let picture = matches!(action, Action::PictureTaken(_));
                    let (next, effects) =
                        reduce(&state, action, &Context { authorization: status });
                    assert!(effects.len() <= 1);
                    // Only delivery clears a pending picture.
                    if state.is_taking_picture && !picture {
                        assert!(next.is_taking_picture);
                    }
                }
            }
        }
    }
}
