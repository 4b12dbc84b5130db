//! Shared test fixtures: a small in-memory tree backend, a few scripted
//! backends for failure-path tests, and helpers for building RPC call
//! datagrams and unwrapping replies.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use nfs2serve::attr::{Attr, ModeSpec};
use nfs2serve::vfs::{Backend, BackendError, BackendFactory, MountOpts, NodeId};
use nfs2serve::xdr::nfs2::{self, filename, ftype};
use nfs2serve::xdr::{self, deserialize, Serialize};

pub const ROOT_ID: u64 = 1;

/// Decodes the u64 a test backend packed into a NodeId.
fn node_key(id: &NodeId) -> u64 {
    u64::from_be_bytes(id.as_bytes().try_into().expect("test NodeId is 8 bytes"))
}

enum Node {
    Dir(HashMap<Vec<u8>, u64>),
    File(Vec<u8>),
    Symlink(Vec<u8>),
}

/// A minimal in-memory filesystem: enough semantics for every NFSv2
/// procedure to be exercised end to end.
pub struct MemFs {
    nodes: Mutex<HashMap<u64, Node>>,
    next_id: AtomicU64,
    terminated: Arc<AtomicU32>,
}

impl MemFs {
    pub fn new(terminated: Arc<AtomicU32>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT_ID, Node::Dir(HashMap::new()));
        MemFs { nodes: Mutex::new(nodes), next_id: AtomicU64::new(ROOT_ID + 1), terminated }
    }

    fn insert_child(
        &self,
        dir: &NodeId,
        name: &filename,
        node: Node,
    ) -> Result<NodeId, BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        match nodes.get_mut(&node_key(dir)) {
            Some(Node::Dir(children)) => {
                if children.contains_key(name.as_ref()) {
                    return Err(BackendError::FileAlreadyExists);
                }
                children.insert(name.0.clone(), id);
            }
            Some(_) => return Err(BackendError::NotADirectory),
            None => return Err(BackendError::NoEnt),
        }
        nodes.insert(id, node);
        Ok(NodeId::from(id))
    }
}

#[async_trait]
impl Backend for MemFs {
    async fn terminate(&self) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
    }

    async fn getattr(&self, id: &NodeId) -> Result<Vec<Attr>, BackendError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&node_key(id)) {
            Some(Node::Dir(children)) => Ok(vec![
                Attr::Type(ftype::NFDIR),
                Attr::Mode(ModeSpec::Bits(0o755)),
                Attr::Nlink(2),
                Attr::Size(children.len() as u32),
            ]),
            Some(Node::File(data)) => Ok(vec![
                Attr::Type(ftype::NFREG),
                Attr::Mode(ModeSpec::Bits(0o644)),
                Attr::Size(data.len() as u32),
            ]),
            Some(Node::Symlink(target)) => Ok(vec![
                Attr::Type(ftype::NFLNK),
                Attr::Mode(ModeSpec::Bits(0o777)),
                Attr::Size(target.len() as u32),
            ]),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn setattr(&self, id: &NodeId, attrs: &nfs2::sattr) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get_mut(&node_key(id)) {
            Some(Node::File(data)) => {
                if attrs.size != nfs2::sattr::UNSET {
                    data.resize(attrs.size as usize, 0);
                }
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn lookup(&self, dir: &NodeId, name: &filename) -> Result<NodeId, BackendError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&node_key(dir)) {
            Some(Node::Dir(children)) => children
                .get(name.as_ref())
                .map(|id| NodeId::from(*id))
                .ok_or(BackendError::NoEnt),
            Some(_) => Err(BackendError::NotADirectory),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn readlink(&self, id: &NodeId) -> Result<nfs2::path, BackendError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&node_key(id)) {
            Some(Node::Symlink(target)) => Ok(target.as_slice().into()),
            Some(_) => Err(BackendError::Failure),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn read(
        &self,
        id: &NodeId,
        offset: u32,
        count: u32,
        _total_count: u32,
    ) -> Result<Vec<u8>, BackendError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&node_key(id)) {
            Some(Node::File(data)) => {
                let start = (offset as usize).min(data.len());
                let end = (start + count as usize).min(data.len());
                Ok(data[start..end].to_vec())
            }
            Some(_) => Err(BackendError::IsDir),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn write(
        &self,
        id: &NodeId,
        _begin_offset: u32,
        offset: u32,
        _total_count: u32,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        match nodes.get_mut(&node_key(id)) {
            Some(Node::File(contents)) => {
                let end = offset as usize + data.len();
                if contents.len() < end {
                    contents.resize(end, 0);
                }
                contents[offset as usize..end].copy_from_slice(data);
                Ok(())
            }
            Some(_) => Err(BackendError::IsDir),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn create(
        &self,
        dir: &NodeId,
        name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        self.insert_child(dir, name, Node::File(Vec::new()))
    }

    async fn remove(&self, dir: &NodeId, name: &filename) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        let child = match nodes.get(&node_key(dir)) {
            Some(Node::Dir(children)) => {
                *children.get(name.as_ref()).ok_or(BackendError::NoEnt)?
            }
            Some(_) => return Err(BackendError::NotADirectory),
            None => return Err(BackendError::NoEnt),
        };
        if matches!(nodes.get(&child), Some(Node::Dir(_))) {
            return Err(BackendError::FileIsADirectory);
        }
        if let Some(Node::Dir(children)) = nodes.get_mut(&node_key(dir)) {
            children.remove(name.as_ref());
        }
        nodes.remove(&child);
        Ok(())
    }

    async fn rename(
        &self,
        from_dir: &NodeId,
        from_name: &filename,
        to_dir: &NodeId,
        to_name: &filename,
    ) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        let child = match nodes.get_mut(&node_key(from_dir)) {
            Some(Node::Dir(children)) => {
                children.remove(from_name.as_ref()).ok_or(BackendError::NoEnt)?
            }
            Some(_) => return Err(BackendError::NotADirectory),
            None => return Err(BackendError::NoEnt),
        };
        match nodes.get_mut(&node_key(to_dir)) {
            Some(Node::Dir(children)) => {
                children.insert(to_name.0.clone(), child);
                Ok(())
            }
            Some(_) => Err(BackendError::NotADirectory),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn link(
        &self,
        from: &NodeId,
        to_dir: &NodeId,
        to_name: &filename,
    ) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        let target = node_key(from);
        if !nodes.contains_key(&target) {
            return Err(BackendError::NoEnt);
        }
        match nodes.get_mut(&node_key(to_dir)) {
            Some(Node::Dir(children)) => {
                children.insert(to_name.0.clone(), target);
                Ok(())
            }
            Some(_) => Err(BackendError::NotADirectory),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn symlink(
        &self,
        dir: &NodeId,
        name: &filename,
        target: &nfs2::path,
        _attrs: &nfs2::sattr,
    ) -> Result<(), BackendError> {
        self.insert_child(dir, name, Node::Symlink(target.0.clone())).map(|_| ())
    }

    async fn mkdir(
        &self,
        dir: &NodeId,
        name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        self.insert_child(dir, name, Node::Dir(HashMap::new()))
    }

    async fn rmdir(&self, dir: &NodeId, name: &filename) -> Result<(), BackendError> {
        let mut nodes = self.nodes.lock().unwrap();
        let child = match nodes.get(&node_key(dir)) {
            Some(Node::Dir(children)) => {
                *children.get(name.as_ref()).ok_or(BackendError::NoEnt)?
            }
            Some(_) => return Err(BackendError::NotADirectory),
            None => return Err(BackendError::NoEnt),
        };
        match nodes.get(&child) {
            Some(Node::Dir(children)) if !children.is_empty() => {
                return Err(BackendError::NotEmpty)
            }
            Some(Node::Dir(_)) => {}
            _ => return Err(BackendError::NotADirectory),
        }
        if let Some(Node::Dir(children)) = nodes.get_mut(&node_key(dir)) {
            children.remove(name.as_ref());
        }
        nodes.remove(&child);
        Ok(())
    }

    async fn readdir(&self, id: &NodeId, _count: u32) -> Result<Vec<filename>, BackendError> {
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&node_key(id)) {
            Some(Node::Dir(children)) => {
                let mut names: Vec<Vec<u8>> = children.keys().cloned().collect();
                names.sort();
                Ok(names.into_iter().map(filename::from).collect())
            }
            Some(_) => Err(BackendError::NotADirectory),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn statfs(&self, _id: &NodeId) -> Result<nfs2::statfsokres, BackendError> {
        Ok(nfs2::statfsokres { tsize: 8192, bsize: 1024, blocks: 1024, bfree: 512, bavail: 256 })
    }
}

/// Factory for [`MemFs`] that counts lifecycle calls.
#[derive(Default)]
pub struct MemFsFactory {
    pub init_calls: AtomicU32,
    pub terminate_calls: Arc<AtomicU32>,
}

#[async_trait]
impl BackendFactory for MemFsFactory {
    async fn init(&self, _opts: &MountOpts) -> Result<(NodeId, Arc<dyn Backend>), BackendError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Ok((NodeId::from(ROOT_ID), Arc::new(MemFs::new(self.terminate_calls.clone()))))
    }
}

/// A scripted single-directory backend: a fixed root id, a fixed
/// listing, and an optional set of names whose lookup fails. Everything
/// else is unsupported.
#[derive(Clone)]
pub struct ListingFs {
    pub root: u64,
    pub names: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl ListingFs {
    pub fn new(root: u64, names: &[&'static str], missing: &[&'static str]) -> Self {
        ListingFs { root, names: names.to_vec(), missing: missing.to_vec() }
    }
}

#[async_trait]
impl Backend for ListingFs {
    async fn terminate(&self) {}

    async fn getattr(&self, id: &NodeId) -> Result<Vec<Attr>, BackendError> {
        if node_key(id) == self.root {
            Ok(vec![Attr::Type(ftype::NFDIR), Attr::Mode(ModeSpec::Bits(0o755))])
        } else {
            Ok(vec![Attr::Type(ftype::NFREG), Attr::Mode(ModeSpec::Bits(0o644))])
        }
    }

    async fn setattr(&self, _id: &NodeId, _attrs: &nfs2::sattr) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn lookup(&self, _dir: &NodeId, name: &filename) -> Result<NodeId, BackendError> {
        let name = std::str::from_utf8(name).map_err(|_| BackendError::NoEnt)?;
        if self.missing.iter().any(|m| *m == name) {
            return Err(BackendError::NoEnt);
        }
        match self.names.iter().position(|n| *n == name) {
            Some(index) => Ok(NodeId::from(100 + index as u64)),
            None => Err(BackendError::NoEnt),
        }
    }

    async fn readlink(&self, _id: &NodeId) -> Result<nfs2::path, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn read(
        &self,
        _id: &NodeId,
        _offset: u32,
        _count: u32,
        _total_count: u32,
    ) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn write(
        &self,
        _id: &NodeId,
        _begin_offset: u32,
        _offset: u32,
        _total_count: u32,
        _data: &[u8],
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn create(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn remove(&self, _dir: &NodeId, _name: &filename) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn rename(
        &self,
        _from_dir: &NodeId,
        _from_name: &filename,
        _to_dir: &NodeId,
        _to_name: &filename,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn link(
        &self,
        _from: &NodeId,
        _to_dir: &NodeId,
        _to_name: &filename,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn symlink(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _target: &nfs2::path,
        _attrs: &nfs2::sattr,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn mkdir(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn rmdir(&self, _dir: &NodeId, _name: &filename) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn readdir(&self, _id: &NodeId, _count: u32) -> Result<Vec<filename>, BackendError> {
        Ok(self.names.iter().map(|n| filename::from(*n)).collect())
    }

    async fn statfs(&self, _id: &NodeId) -> Result<nfs2::statfsokres, BackendError> {
        Err(BackendError::OpUnsupported)
    }
}

pub struct ListingFactory(pub ListingFs);

#[async_trait]
impl BackendFactory for ListingFactory {
    async fn init(&self, _opts: &MountOpts) -> Result<(NodeId, Arc<dyn Backend>), BackendError> {
        Ok((NodeId::from(self.0.root), Arc::new(self.0.clone())))
    }
}

/// A backend whose `getattr` panics, for crash-barrier tests.
pub struct PanickyFs;

#[async_trait]
impl Backend for PanickyFs {
    async fn terminate(&self) {}

    async fn getattr(&self, _id: &NodeId) -> Result<Vec<Attr>, BackendError> {
        panic!("backend blew up");
    }

    async fn setattr(&self, _id: &NodeId, _attrs: &nfs2::sattr) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn lookup(&self, _dir: &NodeId, _name: &filename) -> Result<NodeId, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn readlink(&self, _id: &NodeId) -> Result<nfs2::path, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn read(
        &self,
        _id: &NodeId,
        _offset: u32,
        _count: u32,
        _total_count: u32,
    ) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn write(
        &self,
        _id: &NodeId,
        _begin_offset: u32,
        _offset: u32,
        _total_count: u32,
        _data: &[u8],
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn create(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn remove(&self, _dir: &NodeId, _name: &filename) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn rename(
        &self,
        _from_dir: &NodeId,
        _from_name: &filename,
        _to_dir: &NodeId,
        _to_name: &filename,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn link(
        &self,
        _from: &NodeId,
        _to_dir: &NodeId,
        _to_name: &filename,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn symlink(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _target: &nfs2::path,
        _attrs: &nfs2::sattr,
    ) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn mkdir(
        &self,
        _dir: &NodeId,
        _name: &filename,
        _attrs: &nfs2::sattr,
    ) -> Result<NodeId, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn rmdir(&self, _dir: &NodeId, _name: &filename) -> Result<(), BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn readdir(&self, _id: &NodeId, _count: u32) -> Result<Vec<filename>, BackendError> {
        Err(BackendError::OpUnsupported)
    }

    async fn statfs(&self, _id: &NodeId) -> Result<nfs2::statfsokres, BackendError> {
        Err(BackendError::OpUnsupported)
    }
}

pub struct PanickyFactory;

#[async_trait]
impl BackendFactory for PanickyFactory {
    async fn init(&self, _opts: &MountOpts) -> Result<(NodeId, Arc<dyn Backend>), BackendError> {
        Ok((NodeId::from(1_u64), Arc::new(PanickyFs)))
    }
}

/// Serializes an RPC CALL message with the given procedure arguments
/// appended, ready for `ServerState::process`.
pub fn rpc_call(xid: u32, prog: u32, vers: u32, proc_: u32, args: &[u8]) -> Vec<u8> {
    let call = xdr::rpc::call_body {
        rpcvers: 2,
        prog,
        vers,
        proc: proc_,
        cred: xdr::rpc::opaque_auth::default(),
        verf: xdr::rpc::opaque_auth::default(),
    };
    let msg = xdr::rpc::rpc_msg { xid, body: xdr::rpc::rpc_body::CALL(call) };
    let mut buf = Vec::new();
    msg.serialize(&mut buf).expect("serialize rpc call");
    buf.extend_from_slice(args);
    buf
}

/// Unwraps an accepted SUCCESS reply and returns a cursor positioned at
/// the procedure results.
pub fn open_reply(reply: &[u8], xid: u32) -> Cursor<Vec<u8>> {
    let mut cur = Cursor::new(reply.to_vec());
    let msg = deserialize::<xdr::rpc::rpc_msg>(&mut cur).expect("deserialize reply");
    assert_eq!(msg.xid, xid);
    match msg.body {
        xdr::rpc::rpc_body::REPLY(xdr::rpc::reply_body::MSG_ACCEPTED(accepted)) => {
            match accepted.reply_data {
                xdr::rpc::accept_body::SUCCESS => {}
                other => panic!("expected SUCCESS, got {:?}", other),
            }
        }
        other => panic!("expected MSG_ACCEPTED, got {:?}", other),
    }
    cur
}
