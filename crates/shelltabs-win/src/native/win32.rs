//! Win32-backed [`WindowOps`] implementation.

use std::path::PathBuf;

use shelltabs_core::geometry::Rect;
use shelltabs_core::registry::types::Hwnd;

use windows::Win32::Foundation::{CloseHandle, BOOL, FALSE, HWND, LPARAM, RECT, TRUE};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_FORMAT,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetParent, GetSystemMetrics, GetWindow, GetWindowLongPtrW,
    GetWindowRect, GetWindowTextW, GetWindowThreadProcessId, IsWindow, IsWindowVisible,
    SetForegroundWindow, SetParent, SetWindowLongPtrW, SetWindowPos, ShowWindow, GWL_EXSTYLE,
    GWL_STYLE, GW_OWNER, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN, SWP_NOACTIVATE, SWP_NOZORDER, SW_HIDE, SW_SHOWNA,
};
use windows_core::PWSTR;

use crate::native::WindowOps;

fn hwnd(raw: Hwnd) -> HWND {
    HWND(raw as *mut _)
}

/// Production [`WindowOps`] over the Win32 API.
///
/// Stateless; every call goes straight to the OS. Handles that died
/// between observation and use come back as `false`/`None`, which is
/// exactly what the engine expects.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32WindowOps;

unsafe extern "system" fn enum_windows_cb(win: HWND, lparam: LPARAM) -> BOOL {
    let vec = unsafe { &mut *(lparam.0 as *mut Vec<Hwnd>) };
    vec.push(win.0 as Hwnd);
    TRUE
}

impl WindowOps for Win32WindowOps {
    fn is_alive(&self, raw: Hwnd) -> bool {
        unsafe { IsWindow(hwnd(raw)).as_bool() }
    }

    fn is_visible(&self, raw: Hwnd) -> bool {
        unsafe { IsWindowVisible(hwnd(raw)).as_bool() }
    }

    fn owner(&self, raw: Hwnd) -> Hwnd {
        unsafe {
            GetWindow(hwnd(raw), GW_OWNER)
                .map(|h| h.0 as Hwnd)
                .unwrap_or(0)
        }
    }

    fn title(&self, raw: Hwnd) -> Option<String> {
        let mut buf = [0u16; 512];
        let len = unsafe { GetWindowTextW(hwnd(raw), &mut buf) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn class_name(&self, raw: Hwnd) -> Option<String> {
        let mut buf = [0u16; 256];
        let len = unsafe { GetClassNameW(hwnd(raw), &mut buf) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn process_path(&self, raw: Hwnd) -> Option<PathBuf> {
        let mut pid: u32 = 0;
        unsafe { GetWindowThreadProcessId(hwnd(raw), Some(&mut pid)) };
        if pid == 0 {
            return None;
        }
        let handle =
            unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid) }.ok()?;
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as u32;
        let result = unsafe {
            QueryFullProcessImageNameW(
                handle,
                PROCESS_NAME_FORMAT(0),
                PWSTR(buf.as_mut_ptr()),
                &mut len,
            )
        };
        unsafe {
            let _ = CloseHandle(handle);
        }
        result.ok()?;
        Some(PathBuf::from(String::from_utf16_lossy(&buf[..len as usize])))
    }

    fn style(&self, raw: Hwnd) -> u32 {
        unsafe { GetWindowLongPtrW(hwnd(raw), GWL_STYLE) as u32 }
    }

    fn set_style(&self, raw: Hwnd, style: u32) {
        unsafe {
            SetWindowLongPtrW(hwnd(raw), GWL_STYLE, style as isize);
        }
    }

    fn ex_style(&self, raw: Hwnd) -> u32 {
        unsafe { GetWindowLongPtrW(hwnd(raw), GWL_EXSTYLE) as u32 }
    }

    fn parent(&self, raw: Hwnd) -> Hwnd {
        unsafe { GetParent(hwnd(raw)).map(|h| h.0 as Hwnd).unwrap_or(0) }
    }

    fn set_parent(&self, raw: Hwnd, parent: Hwnd) -> bool {
        let new_parent = if parent == 0 { HWND::default() } else { hwnd(parent) };
        unsafe { SetParent(hwnd(raw), new_parent).is_ok() }
    }

    fn bounds(&self, raw: Hwnd) -> Option<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd(raw), &mut rect) }.ok()?;
        Some(Rect::new(
            rect.left,
            rect.top,
            rect.right - rect.left,
            rect.bottom - rect.top,
        ))
    }

    fn set_bounds(&self, raw: Hwnd, rect: Rect) {
        unsafe {
            let _ = SetWindowPos(
                hwnd(raw),
                HWND::default(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn show(&self, raw: Hwnd) {
        unsafe {
            let _ = ShowWindow(hwnd(raw), SW_SHOWNA);
        }
    }

    fn hide(&self, raw: Hwnd) {
        unsafe {
            let _ = ShowWindow(hwnd(raw), SW_HIDE);
        }
    }

    fn activate(&self, raw: Hwnd) {
        unsafe {
            let _ = SetForegroundWindow(hwnd(raw));
        }
    }

    fn virtual_screen(&self) -> Rect {
        unsafe {
            Rect::new(
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        }
    }

    fn enumerate_top_level(&self) -> Vec<Hwnd> {
        let mut hwnds: Vec<Hwnd> = Vec::new();
        unsafe {
            let _ = EnumWindows(
                Some(enum_windows_cb),
                LPARAM(&mut hwnds as *mut Vec<Hwnd> as isize),
            );
        }
        hwnds
    }
}
